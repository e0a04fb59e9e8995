//! Inbound voice-vendor webhook deliveries.

use crate::ack::{AckService, TriggerType};
use crate::case::retry_policy;
use crate::conversation::{ConversationPayload, Speaker, WebhookEvent};
use crate::error::Error;
use crate::ingestion;
use crate::transcript_update::{self, UpsertOutcome};
use chrono::{DateTime, Utc};
use entity::webhook_log_status::WebhookLogStatus;
use entity::Id;
use entity_api::webhook_log;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

pub mod signature;

pub use signature::SIGNATURE_HEADER;

/// Body returned to the vendor for every delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub case_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookReply {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Verifies the delivery signature when a webhook secret is configured.
pub fn verify_signature(
    config: &Config,
    header: Option<&str>,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<(), Error> {
    match config.elevenlabs_webhook_secret() {
        Some(secret) => signature::verify(
            &secret,
            header,
            body,
            std::time::Duration::from_secs(config.webhook_signature_tolerance_secs),
            now,
        ),
        None => {
            trace!("No webhook secret configured, skipping signature verification");
            Ok(())
        }
    }
}

struct Dispatched {
    status: WebhookLogStatus,
    reply: WebhookReply,
}

impl Dispatched {
    fn processed(reply: WebhookReply) -> Self {
        Self {
            status: WebhookLogStatus::Processed,
            reply,
        }
    }

    fn ignored(message: impl Into<String>) -> Self {
        Self {
            status: WebhookLogStatus::Ignored,
            reply: WebhookReply::ok(message),
        }
    }
}

/// Logs the delivery, acts on the event it carries and completes the log entry with the
/// outcome and processing time.
pub async fn process_delivery(
    db: &DatabaseConnection,
    config: &Config,
    acks: Option<&Arc<AckService>>,
    request_id: Id,
    payload: serde_json::Value,
) -> Result<WebhookReply, Error> {
    let started = Instant::now();
    let parsed = serde_json::from_value::<ConversationPayload>(payload.clone());
    let (event_type, job_id) = match &parsed {
        Ok(payload) => (payload.event_type(), payload.job_id()),
        Err(_) => (None, None),
    };

    let log_entry = webhook_log::create(db, request_id, event_type, job_id, payload).await?;

    let outcome = match parsed {
        Ok(payload) => dispatch(db, config, acks, payload.normalize()).await,
        Err(err) => Err(Error::invalid(format!("Unrecognized webhook payload: {err}"))),
    };

    let elapsed_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    let completed = match &outcome {
        Ok(dispatched) => {
            webhook_log::complete(
                db,
                log_entry.id,
                dispatched.status.clone(),
                dispatched.reply.case_id,
                None,
                elapsed_ms,
            )
            .await
        }
        Err(err) => {
            warn!("Webhook delivery {request_id} failed: {err}");
            webhook_log::complete(
                db,
                log_entry.id,
                WebhookLogStatus::Failed,
                None,
                Some(err.to_string()),
                elapsed_ms,
            )
            .await
        }
    };
    if let Err(err) = completed {
        warn!("Failed to complete webhook log {}: {err}", log_entry.id);
    }

    outcome.map(|dispatched| dispatched.reply)
}

async fn dispatch(
    db: &DatabaseConnection,
    config: &Config,
    acks: Option<&Arc<AckService>>,
    event: WebhookEvent,
) -> Result<Dispatched, Error> {
    debug!("Dispatching webhook event {}", event.name());
    let now = Utc::now();

    match event {
        WebhookEvent::ConversationEnded(conversation) => {
            let outcome = ingestion::ingest(db, &conversation).await?;

            if let (Some(acks), Some(conversation_id)) = (acks, &conversation.conversation_id) {
                let ended = acks.tracker().end(conversation_id, now);
                if ended.is_some() && acks.acks_on_conversation_end() {
                    acks.spawn_generate(
                        conversation_id.clone(),
                        conversation.user_id.clone(),
                        TriggerType::ConversationEnd,
                    );
                }
            }

            Ok(Dispatched::processed(WebhookReply {
                success: true,
                case_id: Some(outcome.case_id),
                confirmation_code: Some(outcome.confirmation_code),
                message: Some("Feedback case created".to_string()),
                error: None,
            }))
        }
        WebhookEvent::ConversationStarted(conversation) => {
            let Some(acks) = acks else {
                return Ok(Dispatched::ignored("Conversation tracking is not enabled"));
            };
            acks.tracker().start(
                &conversation.conversation_id,
                conversation.agent_id,
                conversation.user_id,
                now,
            );
            Ok(Dispatched::processed(WebhookReply::ok(
                "Conversation tracking started",
            )))
        }
        WebhookEvent::ConversationMessage {
            conversation,
            speaker,
            text,
        } => {
            let Some(acks) = acks else {
                return Ok(Dispatched::ignored("Conversation tracking is not enabled"));
            };
            let active = acks.tracker().record_message(
                &conversation.conversation_id,
                conversation.agent_id,
                conversation.user_id.clone(),
                now,
            );
            if !active {
                return Ok(Dispatched::ignored("Conversation has already ended"));
            }

            // Only the caller's words count, so spoken ACKs can't retrigger themselves.
            match (speaker, acks.keywords().find_in(&text)) {
                (Speaker::User, Some(keyword)) => {
                    info!(
                        "Keyword \"{keyword}\" heard in conversation {}",
                        conversation.conversation_id
                    );
                    acks.spawn_generate(
                        conversation.conversation_id,
                        conversation.user_id,
                        TriggerType::Keyword,
                    );
                    Ok(Dispatched::processed(WebhookReply::ok(
                        "ACK generation triggered",
                    )))
                }
                _ => Ok(Dispatched::processed(WebhookReply::ok("Message recorded"))),
            }
        }
        WebhookEvent::TranscriptionStatus(update) => {
            match transcript_update::upsert(db, &retry_policy(config), update).await? {
                UpsertOutcome::Updated(transcript) | UpsertOutcome::Created(transcript) => {
                    Ok(Dispatched::processed(WebhookReply {
                        success: true,
                        case_id: Some(transcript.case_id),
                        message: Some(format!(
                            "Transcript {}",
                            transcript.processing_status
                        )),
                        ..Default::default()
                    }))
                }
                UpsertOutcome::Ignored => Ok(Dispatched::ignored(
                    "No transcript or case matches this job",
                )),
            }
        }
        WebhookEvent::Unhandled { event_type } => {
            debug!("Ignoring webhook event {event_type:?}");
            Ok(Dispatched::ignored(format!(
                "Event {} does not require processing",
                event_type.as_deref().unwrap_or("(none)")
            )))
        }
    }
}


#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::ack::ConversationTracker;
    use crate::gateway::MockVoiceGateway;
    use clap::Parser;
    use entity::case_category::CaseCategory;
    use entity::case_status::CaseStatus;
    use entity::sender_type::SenderType;
    use entity::transcript_status::TranscriptStatus;
    use entity::{ai_insights, cases, hr_interactions, transcripts, webhook_logs};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use serde_json::json;

    fn log_entry(status: WebhookLogStatus) -> webhook_logs::Model {
        webhook_logs::Model {
            id: Id::new_v4(),
            request_id: Id::new_v4(),
            event_type: Some("ping".to_string()),
            external_job_id: None,
            case_id: None,
            status,
            payload: json!({ "type": "ping" }),
            error_message: None,
            processing_time_ms: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn unmatched_events_are_acknowledged_and_logged_as_ignored() -> Result<(), Error> {
        let received = log_entry(WebhookLogStatus::Received);
        let ignored = webhook_logs::Model {
            status: WebhookLogStatus::Ignored,
            processing_time_ms: Some(1),
            ..received.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[received.clone()]])
            .append_query_results([[received]])
            .append_query_results([[ignored]])
            .into_connection();
        let config = Config::parse_from(["feedback_platform"]);

        let reply =
            process_delivery(&db, &config, None, Id::new_v4(), json!({ "type": "ping" })).await?;

        assert!(reply.success);
        assert_eq!(reply.case_id, None);
        assert_eq!(
            reply.message.as_deref(),
            Some("Event ping does not require processing")
        );
        assert_eq!(db.into_transaction_log().len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn tracking_events_without_an_ack_service_are_ignored() -> Result<(), Error> {
        let received = log_entry(WebhookLogStatus::Received);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[received.clone()]])
            .append_query_results([[received.clone()]])
            .append_query_results([[received]])
            .into_connection();
        let config = Config::parse_from(["feedback_platform"]);

        let reply = process_delivery(
            &db,
            &config,
            None,
            Id::new_v4(),
            json!({ "type": "conversation.started", "conversationId": "conv_1" }),
        )
        .await?;

        assert!(reply.success);
        assert_eq!(
            reply.message.as_deref(),
            Some("Conversation tracking is not enabled")
        );
        Ok(())
    }

    #[tokio::test]
    async fn ended_conversation_creates_a_case_and_replies_with_its_code() -> Result<(), Error> {
        let now = Utc::now();
        let case_id = Id::new_v4();
        let received = log_entry(WebhookLogStatus::Received);
        let processed = webhook_logs::Model {
            status: WebhookLogStatus::Processed,
            case_id: Some(case_id),
            processing_time_ms: Some(3),
            ..received.clone()
        };
        let case = cases::Model {
            id: case_id,
            confirmation_code: "QW12ER34TY".to_string(),
            title: "Harassment Report".to_string(),
            category: CaseCategory::Harassment,
            summary: "summary".to_string(),
            severity: 5,
            status: CaseStatus::Open,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let transcript = transcripts::Model {
            id: Id::new_v4(),
            case_id,
            raw_transcript: "My manager harasses me every day".to_string(),
            processed_summary: None,
            sentiment_score: -0.8,
            external_job_id: None,
            audio_duration_seconds: None,
            confidence_score: None,
            language_code: None,
            processing_status: TranscriptStatus::Completed,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let interaction = hr_interactions::Model {
            id: Id::new_v4(),
            case_id,
            message: "received".to_string(),
            sender_type: SenderType::System,
            sender_name: "System".to_string(),
            created_at: now.into(),
        };
        let insight = ai_insights::Model {
            id: Id::new_v4(),
            case_id,
            insight_type: ingestion::CONVERSATION_INSIGHT.to_string(),
            content: json!({}),
            confidence_score: ingestion::CLASSIFIER_CONFIDENCE,
            created_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[received.clone()]])
            .append_query_results([[case]])
            .append_query_results([[transcript]])
            .append_query_results([[interaction]])
            .append_query_results([[insight]])
            .append_query_results([[received]])
            .append_query_results([[processed]])
            .into_connection();
        let config = Config::parse_from(["feedback_platform"]);

        let reply = process_delivery(
            &db,
            &config,
            None,
            Id::new_v4(),
            json!({
                "type": "conversation.ended",
                "conversation_id": "conv_1",
                "transcript": {
                    "user_messages": ["My manager harasses me every day"],
                    "agent_messages": ["I'm sorry to hear that."]
                }
            }),
        )
        .await?;

        assert_eq!(
            reply,
            WebhookReply {
                success: true,
                case_id: Some(case_id),
                confirmation_code: Some("QW12ER34TY".to_string()),
                message: Some("Feedback case created".to_string()),
                error: None,
            }
        );

        // Log entry, ingestion transaction, then the log lookup and its completion.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 4);
        let completion = &log[3].statements()[0];
        let values = completion.values.as_ref().map(|values| &values.0).unwrap();
        assert!(values.contains(&Value::from("processed")));
        assert!(values.contains(&Value::from(case_id)));
        Ok(())
    }

    #[tokio::test]
    async fn agent_speech_with_a_keyword_does_not_trigger_an_ack() -> Result<(), Error> {
        let received = log_entry(WebhookLogStatus::Received);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[received.clone()]])
                .append_query_results([[received.clone()]])
                .append_query_results([[received]])
                .into_connection(),
        );
        let config = Config::parse_from(["feedback_platform"]);
        let mut gateway = MockVoiceGateway::new();
        gateway.expect_inject_message().never();
        let tracker = Arc::new(ConversationTracker::new());
        let acks = Arc::new(AckService::new(
            &db,
            Arc::new(gateway),
            Arc::clone(&tracker),
            &config,
        ));

        let reply = process_delivery(
            &db,
            &config,
            Some(&acks),
            Id::new_v4(),
            json!({
                "type": "agent_response",
                "conversation_id": "conv_9",
                "text": "Your acknowledgment number is: 1, 2, 3."
            }),
        )
        .await?;

        assert_eq!(reply.message.as_deref(), Some("Message recorded"));
        let state = tracker.get("conv_9").unwrap();
        assert_eq!(state.ack_count, 0);
        assert_eq!(state.last_ack_time, None);
        Ok(())
    }
}
