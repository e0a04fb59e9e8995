//! ElevenLabs Conversational AI client.

use super::VoiceGateway;
use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use serde::Serialize;
use service::config::Config;

const API_KEY_HEADER: &str = "xi-api-key";

#[derive(Debug, Serialize)]
struct InjectMessageRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<&'a str>,
}

pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: String,
    voice_id: Option<String>,
}

impl ElevenLabsClient {
    /// Builds a client from the configured credentials. Fails with a configuration error
    /// when no API key is set.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let api_key = config.elevenlabs_api_key().ok_or_else(|| {
            warn!("ELEVENLABS_API_KEY is not set, cannot call the voice gateway");
            Error::config()
        })?;

        let mut headers = reqwest::header::HeaderMap::new();
        let mut header_value = reqwest::header::HeaderValue::from_str(&api_key).map_err(|e| {
            warn!("Failed to create ElevenLabs auth header: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;
        header_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.elevenlabs_base_url().trim_end_matches('/').to_string(),
            voice_id: config.elevenlabs_voice_id(),
        })
    }
}

#[async_trait]
impl VoiceGateway for ElevenLabsClient {
    async fn inject_message(&self, conversation_id: &str, text: &str) -> Result<(), Error> {
        let url = format!(
            "{}/v1/convai/conversations/{}/inject",
            self.base_url, conversation_id
        );

        debug!("Injecting message into conversation {conversation_id}");

        let response = self
            .client
            .post(&url)
            .json(&InjectMessageRequest {
                text,
                voice_id: self.voice_id.as_deref(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach ElevenLabs: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("ElevenLabs API error ({status}): {error_text}");
            Err(Error::external(format!(
                "ElevenLabs returned {status}: {error_text}"
            )))
        }
    }
}
