use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::interaction::MessageParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::sender_type::SenderType;
use domain::{hr_interaction as HrInteractionApi, Id};
use log::*;
use service::config::ApiVersion;

/// POST an HR reply on a case
#[utoipa::path(
    post,
    path = "/cases/{id}/interactions",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Case id to reply on")
    ),
    request_body = crate::params::interaction::MessageParams,
    responses(
        (status = 201, description = "Reply added to the case", body = domain::hr_interactions::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Case not found"),
        (status = 422, description = "Empty message, or the case is closed")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<MessageParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST HR reply on case {id} from {}", user.email);

    let interaction = HrInteractionApi::send_message(
        app_state.db_conn_ref(),
        id,
        SenderType::HrManager,
        Some(&user.name),
        &params.message,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), interaction)),
    ))
}
