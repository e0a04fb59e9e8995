//! Turns a finished voice conversation into a persisted case.

use std::future::Future;

use crate::classifier::{classify, Classification};
use crate::confirmation::generate_confirmation_code;
use crate::conversation::Conversation;
use crate::error::Error;
use entity::sender_type::SenderType;
use entity::transcript_status::TranscriptStatus;
use entity::Id;
use entity_api::{ai_insight, case, hr_interaction, transcript};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// Attempts at finding an unused confirmation code before giving up.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// Confidence recorded on keyword-classifier insights.
pub const CLASSIFIER_CONFIDENCE: f64 = 0.8;

pub const CONVERSATION_INSIGHT: &str = "elevenlabs_conversation";
pub const SENTIMENT_INSIGHT: &str = "sentiment_analysis";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IngestionOutcome {
    #[schema(value_type = Uuid)]
    pub case_id: Id,
    pub confirmation_code: String,
    pub classification: Classification,
}

/// Runs `write` with fresh codes from `next_code` until it stops hitting the unique
/// constraint, up to `MAX_CODE_ATTEMPTS` times.
pub(crate) async fn with_fresh_code<T, G, F, Fut>(
    mut next_code: G,
    mut write: F,
) -> Result<T, Error>
where
    G: FnMut() -> String,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 1;
    loop {
        let code = next_code();
        match write(code.clone()).await {
            Err(err) if err.is_conflict() && attempt < MAX_CODE_ATTEMPTS => {
                warn!("Confirmation code {code} already taken (attempt {attempt}), regenerating");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Classifies the conversation and writes its case, transcript, system interaction and
/// insights in a single transaction.
pub async fn ingest(
    db: &DatabaseConnection,
    conversation: &Conversation,
) -> Result<IngestionOutcome, Error> {
    let feedback = conversation.feedback_text();
    let classification = classify(&feedback, &conversation.metrics());

    debug!(
        "Conversation {:?} classified as {} (severity {})",
        conversation.conversation_id, classification.category, classification.severity
    );

    let (case_id, confirmation_code) = with_fresh_code(generate_confirmation_code, |code| {
        write_case(db, conversation, &feedback, &classification, code)
    })
    .await?;

    Ok(IngestionOutcome {
        case_id,
        confirmation_code,
        classification,
    })
}

async fn write_case(
    db: &DatabaseConnection,
    conversation: &Conversation,
    feedback: &str,
    classification: &Classification,
    confirmation_code: String,
) -> Result<(Id, String), Error> {
    let txn = db.begin().await?;

    let case = case::create(
        &txn,
        case::NewCase {
            confirmation_code,
            title: classification.title.clone(),
            category: classification.category,
            summary: classification.summary.clone(),
            severity: classification.severity,
        },
    )
    .await?;

    transcript::create(
        &txn,
        transcript::NewTranscript {
            case_id: case.id,
            raw_transcript: feedback.to_string(),
            processed_summary: Some(classification.summary.clone()),
            sentiment_score: classification.sentiment,
            audio_duration_seconds: Some(conversation.duration_seconds)
                .filter(|duration| *duration > 0.0),
            processing_status: TranscriptStatus::Completed,
            ..Default::default()
        },
    )
    .await?;

    hr_interaction::create(
        &txn,
        case.id,
        &format!(
            "Your feedback was received and reviewed by our AI assistant. It was categorized \
             as {} with severity {}/5. Confirmation code: {}.",
            classification.category, classification.severity, case.confirmation_code
        ),
        SenderType::System,
        None,
    )
    .await?;

    ai_insight::create(
        &txn,
        case.id,
        CONVERSATION_INSIGHT,
        json!({
            "conversation_id": conversation.conversation_id,
            "agent_id": conversation.agent_id,
            "title": classification.title,
            "key_topics": classification.key_topics,
            "urgency_indicators": classification.urgency_indicators,
            "vendor_summary": conversation.summary,
            "duration_seconds": conversation.duration_seconds,
            "user_message_count": conversation.user_messages.len(),
            "agent_message_count": conversation.agent_messages.len(),
        }),
        CLASSIFIER_CONFIDENCE,
    )
    .await?;

    if let Some(vendor) = &conversation.vendor_sentiment {
        ai_insight::create(
            &txn,
            case.id,
            SENTIMENT_INSIGHT,
            json!({
                "label": vendor.label,
                "confidence": vendor.confidence,
                "emotions": vendor.emotions,
                "sentiment_score": classification.sentiment,
            }),
            vendor.confidence,
        )
        .await?;
    }

    txn.commit().await?;

    info!(
        "Created case {} ({}) from conversation {:?}",
        case.confirmation_code, case.category, conversation.conversation_id
    );

    Ok((case.id, case.confirmation_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use std::cell::Cell;

    fn conflict() -> Error {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Conflict,
            )),
        }
    }

    #[tokio::test]
    async fn regenerates_code_after_a_collision() {
        let generated = Cell::new(0);
        let next_code = || {
            generated.set(generated.get() + 1);
            format!("CODE{:06}", generated.get())
        };

        let result = with_fresh_code(next_code, |code| async move {
            if code == "CODE000001" {
                Err(conflict())
            } else {
                Ok(code)
            }
        })
        .await;

        assert_eq!(result.unwrap(), "CODE000002");
        assert_eq!(generated.get(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let attempts = Cell::new(0);

        let result: Result<(), Error> = with_fresh_code(
            || "SAMECODE00".to_string(),
            |_| {
                attempts.set(attempts.get() + 1);
                async { Err(conflict()) }
            },
        )
        .await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(attempts.get(), MAX_CODE_ATTEMPTS);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let attempts = Cell::new(0);

        let result: Result<(), Error> = with_fresh_code(
            || "ANYCODE000".to_string(),
            |_| {
                attempts.set(attempts.get() + 1);
                async { Err(Error::invalid("Summary is required")) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }
}
