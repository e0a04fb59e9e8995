use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    // List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
    pub fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                    EntityErrorKind::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    EntityErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                    EntityErrorKind::Conflict => StatusCode::CONFLICT,
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                },
                InternalErrorKind::Webhook(_) => StatusCode::UNAUTHORIZED,
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network | ExternalErrorKind::Other(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Text safe to return to a caller. Validation reasons are shown as-is; everything else
    /// collapses to the status line so internals don't leak.
    pub fn public_message(&self) -> String {
        let status = self.status_code();
        match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid(
                reason,
            ))) => reason.clone(),
            DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Unauthenticated,
            )) => "Invalid credentials".to_string(),
            DomainErrorKind::Internal(InternalErrorKind::Webhook(_)) => {
                "Invalid signature".to_string()
            }
            _ => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_uppercase(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        } else {
            debug!("Request rejected ({status}): {}", self.0);
        }
        (status, self.public_message()).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
