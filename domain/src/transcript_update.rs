//! Vendor transcription job updates, upserted by external job id.

use crate::conversation::TranscriptionUpdate;
use crate::error::Error;
use entity::transcripts;
use entity_api::retry::RetryPolicy;
use entity_api::{case, transcript};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Updated(transcripts::Model),
    Created(transcripts::Model),
    /// Unknown job with no case to attach it to.
    Ignored,
}

/// Applies a job status change. The case lookup for an unknown job runs, with retries, before
/// the write transaction opens; a failed statement aborts a Postgres transaction.
pub async fn upsert(
    db: &DatabaseConnection,
    policy: &RetryPolicy,
    update: TranscriptionUpdate,
) -> Result<UpsertOutcome, Error> {
    let existing = transcript::find_by_external_job_id(db, &update.external_job_id).await?;

    let case = match (&existing, update.confirmation_code.as_deref()) {
        (None, Some(code)) => Some(case::find_by_confirmation_code(db, policy, code).await?),
        (None, None) => {
            info!(
                "Ignoring status for unknown transcript job {}",
                update.external_job_id
            );
            return Ok(UpsertOutcome::Ignored);
        }
        (Some(_), _) => None,
    };

    let txn = db.begin().await?;

    let outcome = match (existing, case) {
        (Some(existing), _) => {
            debug!(
                "Transcript job {} is now {:?}",
                update.external_job_id, update.status
            );
            let updated = transcript::update_processing(
                &txn,
                existing.id,
                transcript::ProcessingUpdate {
                    processing_status: update.status,
                    raw_transcript: update.text,
                    audio_duration_seconds: update.audio_duration_seconds,
                    confidence_score: update.confidence,
                    language_code: update.language_code,
                    error_message: update.error_message,
                },
            )
            .await?;
            UpsertOutcome::Updated(updated)
        }
        (None, Some(case)) => {
            info!(
                "Attaching transcript job {} to case {}",
                update.external_job_id, case.confirmation_code
            );
            let created = transcript::create(
                &txn,
                transcript::NewTranscript {
                    case_id: case.id,
                    raw_transcript: update.text.unwrap_or_default(),
                    external_job_id: Some(update.external_job_id),
                    audio_duration_seconds: update.audio_duration_seconds,
                    confidence_score: update.confidence,
                    language_code: update.language_code,
                    processing_status: update.status,
                    error_message: update.error_message,
                    ..Default::default()
                },
            )
            .await?;
            UpsertOutcome::Created(created)
        }
        (None, None) => UpsertOutcome::Ignored,
    };

    txn.commit().await?;
    Ok(outcome)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::case_category::CaseCategory;
    use entity::case_status::CaseStatus;
    use entity::cases;
    use entity::transcript_status::TranscriptStatus;
    use entity::Id;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn update(confirmation_code: Option<&str>) -> TranscriptionUpdate {
        TranscriptionUpdate {
            external_job_id: "job_1".to_string(),
            status: TranscriptStatus::Completed,
            text: Some("final text".to_string()),
            confidence: Some(0.9),
            audio_duration_seconds: Some(61.5),
            language_code: Some("en".to_string()),
            error_message: None,
            confirmation_code: confirmation_code.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn unknown_job_without_case_reference_is_ignored() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transcripts::Model>::new()])
            .into_connection();

        let outcome = upsert(&db, &RetryPolicy::immediate(0), update(None)).await?;

        assert_eq!(outcome, UpsertOutcome::Ignored);
        Ok(())
    }

    #[tokio::test]
    async fn known_job_is_updated_in_place() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let existing = transcripts::Model {
            id: Id::new_v4(),
            case_id: Id::new_v4(),
            raw_transcript: String::new(),
            processed_summary: None,
            sentiment_score: 0.0,
            external_job_id: Some("job_1".to_string()),
            audio_duration_seconds: None,
            confidence_score: None,
            language_code: None,
            processing_status: TranscriptStatus::Processing,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let completed = transcripts::Model {
            raw_transcript: "final text".to_string(),
            processing_status: TranscriptStatus::Completed,
            confidence_score: Some(0.9),
            ..existing.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]])
            .append_query_results([[existing.clone()]])
            .append_query_results([[completed.clone()]])
            .into_connection();

        let outcome = upsert(&db, &RetryPolicy::immediate(0), update(None)).await?;

        assert_eq!(outcome, UpsertOutcome::Updated(completed));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_job_is_attached_to_case_looked_up_outside_the_write() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let case = cases::Model {
            id: Id::new_v4(),
            confirmation_code: "AB12CD34EF".to_string(),
            title: "Employee Feedback Report".to_string(),
            category: CaseCategory::GeneralFeedback,
            summary: "summary".to_string(),
            severity: 2,
            status: CaseStatus::Open,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let created = transcripts::Model {
            id: Id::new_v4(),
            case_id: case.id,
            raw_transcript: "final text".to_string(),
            processed_summary: None,
            sentiment_score: 0.0,
            external_job_id: Some("job_1".to_string()),
            audio_duration_seconds: Some(61.5),
            confidence_score: Some(0.9),
            language_code: Some("en".to_string()),
            processing_status: TranscriptStatus::Completed,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transcripts::Model>::new()])
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .append_query_results([[case]])
            .append_query_results([[created.clone()]])
            .into_connection();

        let outcome = upsert(&db, &RetryPolicy::immediate(1), update(Some("ab12cd34ef"))).await?;

        assert_eq!(outcome, UpsertOutcome::Created(created));
        // Job lookup, failed and retried case lookups each stand alone; only the insert is
        // wrapped in the transaction.
        assert_eq!(db.into_transaction_log().len(), 4);
        Ok(())
    }
}
