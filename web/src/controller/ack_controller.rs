use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::ack::CreateParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::ack::TriggerType;
use domain::error::Error as DomainError;
use log::*;

/// POST generate an ACK number and speak it into a live conversation
///
/// Responds once every message has been attempted, so the call takes a few seconds.
#[utoipa::path(
    post,
    path = "/acks",
    request_body = crate::params::ack::CreateParams,
    responses(
        (status = 200, description = "ACK generated; see status for injection outcome", body = domain::ack::AckResult),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 500, description = "ACK generation is not configured")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST manual ACK for conversation {} by {}",
        params.conversation_id, user.email
    );

    let ack_service = app_state.ack_service.as_ref().ok_or_else(|| {
        warn!("Manual ACK requested but no voice gateway is configured");
        DomainError::config()
    })?;

    let result = ack_service
        .generate(&params.conversation_id, params.user_id, TriggerType::Manual)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}
