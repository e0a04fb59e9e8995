use crate::error::Error;
use entity::case_status::CaseStatus;
use entity::Id;
use entity_api::retry::RetryPolicy;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub use entity_api::case::{
    find_by_id, normalize_confirmation_code, CaseWithDetails, NewCase, CONFIRMATION_CODE_LEN,
};
pub use entity_api::cases::Model;

/// Read retry policy built from the service configuration.
pub fn retry_policy(config: &Config) -> RetryPolicy {
    RetryPolicy::new(config.store_max_retries, config.store_retry_base_delay())
}

pub async fn find_all_with_details(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<Vec<CaseWithDetails>, Error> {
    Ok(entity_api::case::find_all_with_details(db, &retry_policy(config)).await?)
}

pub async fn find_by_id_with_details(
    db: &DatabaseConnection,
    config: &Config,
    id: Id,
) -> Result<CaseWithDetails, Error> {
    Ok(entity_api::case::find_by_id_with_details(db, &retry_policy(config), id).await?)
}

pub async fn find_by_confirmation_code(
    db: &DatabaseConnection,
    config: &Config,
    code: &str,
) -> Result<Model, Error> {
    Ok(entity_api::case::find_by_confirmation_code(db, &retry_policy(config), code).await?)
}

/// Sets a case's status. Any status may follow any other.
pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: CaseStatus,
) -> Result<Model, Error> {
    Ok(entity_api::case::update_status(db, id, status).await?)
}

/// What an employee sees on the tracking page: the case and its message thread.
#[derive(Debug, Clone, PartialEq, serde::Serialize, utoipa::ToSchema)]
pub struct TrackingView {
    pub case: Model,
    pub interactions: Vec<entity_api::hr_interactions::Model>,
    pub accepts_messages: bool,
}

pub async fn find_tracking_view(
    db: &DatabaseConnection,
    config: &Config,
    code: &str,
) -> Result<TrackingView, Error> {
    let case = find_by_confirmation_code(db, config, code).await?;
    let interactions = entity_api::hr_interaction::find_by_case_id(db, case.id).await?;

    Ok(TrackingView {
        accepts_messages: case.status.accepts_messages(),
        case,
        interactions,
    })
}
