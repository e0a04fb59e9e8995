//! Audit rows for inbound webhook deliveries.

use super::error::Error;
use entity::webhook_log_status::WebhookLogStatus;
use entity::webhook_logs::{ActiveModel, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait,
};

/// Records a delivery as soon as it arrives, before any processing.
pub async fn create(
    db: &impl ConnectionTrait,
    request_id: Id,
    event_type: Option<String>,
    external_job_id: Option<String>,
    payload: Json,
) -> Result<Model, Error> {
    debug!("Logging webhook delivery {request_id} ({event_type:?})");

    let active_model = ActiveModel {
        request_id: Set(request_id),
        event_type: Set(event_type),
        external_job_id: Set(external_job_id),
        case_id: Set(None),
        status: Set(WebhookLogStatus::Received),
        payload: Set(payload),
        error_message: Set(None),
        processing_time_ms: Set(None),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Stamps the outcome of a delivery onto its log row.
pub async fn complete(
    db: &impl ConnectionTrait,
    id: Id,
    status: WebhookLogStatus,
    case_id: Option<Id>,
    error_message: Option<String>,
    processing_time_ms: i64,
) -> Result<Model, Error> {
    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        request_id: Unchanged(existing.request_id),
        event_type: Unchanged(existing.event_type),
        external_job_id: Unchanged(existing.external_job_id),
        case_id: Set(case_id.or(existing.case_id)),
        status: Set(status),
        payload: Unchanged(existing.payload),
        error_message: Set(error_message),
        processing_time_ms: Set(Some(processing_time_ms)),
        created_at: Unchanged(existing.created_at),
    };

    Ok(active_model.update(db).await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn complete_records_outcome_and_timing() -> Result<(), Error> {
        let received = Model {
            id: Id::new_v4(),
            request_id: Id::new_v4(),
            event_type: Some("conversation.ended".to_string()),
            external_job_id: None,
            case_id: None,
            status: WebhookLogStatus::Received,
            payload: json!({"type": "conversation.ended"}),
            error_message: None,
            processing_time_ms: None,
            created_at: chrono::Utc::now().into(),
        };
        let case_id = Id::new_v4();
        let processed = Model {
            status: WebhookLogStatus::Processed,
            case_id: Some(case_id),
            processing_time_ms: Some(42),
            ..received.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[received.clone()]])
            .append_query_results([[processed.clone()]])
            .into_connection();

        let completed = complete(
            &db,
            received.id,
            WebhookLogStatus::Processed,
            Some(case_id),
            None,
            42,
        )
        .await?;

        assert_eq!(completed, processed);
        assert_eq!(db.into_transaction_log().len(), 2);
        Ok(())
    }
}
