//! Anonymous employee access to a case by its confirmation code.

use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::interaction::MessageParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{case as CaseApi, hr_interaction as HrInteractionApi};
use log::*;
use service::config::ApiVersion;

/// GET a case's status and message thread by confirmation code
#[utoipa::path(
    get,
    path = "/tracking/{code}",
    params(
        ApiVersion,
        ("code" = String, Path, description = "10 character confirmation code, case-insensitive")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the case", body = domain::case::TrackingView),
        (status = 404, description = "No case has this confirmation code"),
        (status = 422, description = "Confirmation code is not 10 characters"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET tracking view for a confirmation code");

    let view = CaseApi::find_tracking_view(app_state.db_conn_ref(), &app_state.config, &code)
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), view)))
}

/// POST an anonymous follow-up message to an open case
#[utoipa::path(
    post,
    path = "/tracking/{code}/messages",
    params(
        ApiVersion,
        ("code" = String, Path, description = "10 character confirmation code, case-insensitive")
    ),
    request_body = crate::params::interaction::MessageParams,
    responses(
        (status = 201, description = "Message added to the case", body = domain::hr_interactions::Model),
        (status = 404, description = "No case has this confirmation code"),
        (status = 422, description = "Empty message, or the case is closed"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create_message(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(code): Path<String>,
    Json(params): Json<MessageParams>,
) -> Result<impl IntoResponse, Error> {
    let interaction = HrInteractionApi::send_employee_message(
        app_state.db_conn_ref(),
        &app_state.config,
        &code,
        &params.message,
    )
    .await?;

    info!("Employee message added to case {}", interaction.case_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), interaction)),
    ))
}
