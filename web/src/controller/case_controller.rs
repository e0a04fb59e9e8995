use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::case::UpdateStatusParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{case as CaseApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET all cases with their transcripts, interactions and insights, newest first
#[utoipa::path(
    get,
    path = "/cases",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all cases", body = [domain::case::CaseWithDetails]),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all cases for {}", user.email);

    let cases = CaseApi::find_all_with_details(app_state.db_conn_ref(), &app_state.config).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), cases)))
}

/// GET a case with its full history
#[utoipa::path(
    get,
    path = "/cases/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Case id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the case", body = domain::case::CaseWithDetails),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Case not found"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET case by id: {id}");

    let case =
        CaseApi::find_by_id_with_details(app_state.db_conn_ref(), &app_state.config, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), case)))
}

/// PUT a case's status
#[utoipa::path(
    put,
    path = "/cases/{id}/status",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Case id to update")
    ),
    request_body = crate::params::case::UpdateStatusParams,
    responses(
        (status = 200, description = "Successfully updated the case status", body = domain::cases::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Case not found"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_status(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<impl IntoResponse, Error> {
    info!("{} set case {id} to {}", user.email, params.status);

    let case = CaseApi::update_status(app_state.db_conn_ref(), id, params.status).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), case)))
}
