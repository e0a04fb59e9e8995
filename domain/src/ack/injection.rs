use crate::gateway::VoiceGateway;
use chrono::{DateTime, Utc};
use log::*;
use serde::Serialize;
use service::config::Config;
use std::time::Duration;
use utoipa::ToSchema;

/// Delays between injected messages. The first gap is longer to let the vendor's
/// text-to-speech buffer settle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub initial_delay: Duration,
    pub message_delay: Duration,
}

impl Pacing {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.ack_initial_delay_ms),
            message_delay: Duration::from_millis(config.ack_message_delay_ms),
        }
    }

    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            message_delay: Duration::ZERO,
        }
    }

    fn delay_before(&self, index: usize) -> Option<Duration> {
        match index {
            0 => None,
            1 => Some(self.initial_delay),
            _ => Some(self.message_delay),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResult {
    pub message_index: usize,
    pub success: bool,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InjectionStatus {
    Injected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InjectionReport {
    pub status: InjectionStatus,
    pub results: Vec<MessageResult>,
}

impl InjectionReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.success).count()
    }
}

/// Speaks `messages` into the conversation one after another. A failed message does not stop
/// the sequence; the report is `Injected` when at least one message got through.
pub async fn inject_messages(
    gateway: &dyn VoiceGateway,
    conversation_id: &str,
    messages: &[String],
    pacing: Pacing,
) -> InjectionReport {
    let mut results = Vec::with_capacity(messages.len());

    for (index, message) in messages.iter().enumerate() {
        if let Some(delay) = pacing.delay_before(index) {
            tokio::time::sleep(delay).await;
        }

        let outcome = gateway.inject_message(conversation_id, message).await;
        if let Err(err) = &outcome {
            warn!("ACK message {index} failed for conversation {conversation_id}: {err}");
        }

        results.push(MessageResult {
            message_index: index,
            success: outcome.is_ok(),
            timestamp: Utc::now(),
            error: outcome.err().map(|err| err.to_string()),
        });
    }

    let status = if results.iter().any(|result| result.success) {
        InjectionStatus::Injected
    } else {
        InjectionStatus::Failed
    };

    InjectionReport { status, results }
}
