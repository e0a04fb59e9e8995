use domain::case_status::CaseStatus;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateStatusParams {
    pub status: CaseStatus,
}
