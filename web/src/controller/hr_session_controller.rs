use crate::controller::ApiResponse;
use crate::error::{Error as WebError, Result as WebResult};
use axum::{http::StatusCode, response::IntoResponse, Form, Json};
use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};
use domain::hr_user::{AuthSession, Credentials};
use log::*;
use serde_json::json;

fn unauthenticated(source: Option<Box<dyn std::error::Error + Send + Sync>>) -> WebError {
    WebError::from(DomainError {
        source,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
            EntityErrorKind::Unauthenticated,
        )),
    })
}

/// Logs an HR user in and returns a new session cookie.
///
/// Successful login will return a session cookie with id, e.g.:
/// set-cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df; HttpOnly; SameSite=Strict; Path=/; Max-Age=86399
///
/// Pass the session id back on every HR call, e.g.:
/// curl -v --header "Cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df" --header "x-version: 1.0.0-beta1" --request GET http://localhost:4000/cases
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = domain::hr_user::Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logs in and returns session authentication cookie"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn login(
    mut auth_session: AuthSession,
    Form(creds): Form<Credentials>,
) -> WebResult<impl IntoResponse> {
    let user = match auth_session.authenticate(creds.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Authentication failed for HR login");
            return Err(unauthenticated(None));
        }
        Err(auth_error) => {
            // Unknown accounts and wrong passwords both land here as a 401.
            info!("Authentication failed with error: {auth_error}");
            return Err(unauthenticated(Some(Box::new(auth_error))));
        }
    };

    if let Err(login_error) = auth_session.login(&user).await {
        warn!("Session login failed: {login_error:?}");
        return Err(WebError::from(DomainError {
            source: Some(Box::new(login_error)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Session login failed".to_string(),
            )),
        }));
    }

    let hr_session_json = json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "role": user.role,
    });

    debug!("hr_session_json: {hr_session_json}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), hr_session_json)))
}

/// Logs the HR user out by destroying their session.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Successfully logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn logout(mut auth_session: AuthSession) -> impl IntoResponse {
    trace!("HrSessionController::logout()");
    match auth_session.logout().await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
