use serde::Deserialize;
use utoipa::ToSchema;

/// Manual ACK request from an integrator.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateParams {
    pub conversation_id: String,
    pub user_id: Option<String>,
}
