//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;
use sea_orm::SqlErr;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into three major types:
///  * Errors in the caller's input, rejected before any store round trip. Ex ValidationError
///  * Errors related to data. Ex RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Bad input shape or range, carries a human readable reason
    ValidationError(String),
    // Record not found
    RecordNotFound,
    // Unique constraint violated, e.g. a duplicate confirmation code
    RecordAlreadyExists,
    // Record not updated
    RecordNotUpdated,
    // Record not authenticated
    RecordUnauthenticated,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Other errors
    Other,
}

impl Error {
    pub fn validation(reason: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError(reason.into()),
        }
    }

    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }

    /// Same error for unknown accounts and wrong passwords.
    pub fn invalid_credentials() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordUnauthenticated,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            EntityApiErrorKind::ValidationError(reason) => write!(f, "{reason}"),
            EntityApiErrorKind::RecordNotFound => write!(f, "Record not found"),
            EntityApiErrorKind::RecordAlreadyExists => write!(f, "Record already exists"),
            EntityApiErrorKind::RecordUnauthenticated => write!(f, "Invalid credentials"),
            _ => write!(f, "Entity API Error: {:?}", self),
        }
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordAlreadyExists,
            };
        }

        match err {
            DbErr::RecordNotFound(_) => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotFound,
            },
            DbErr::RecordNotUpdated => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordNotUpdated,
            },
            _ => Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::SystemError,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_their_reason() {
        let err = Error::validation("Severity must be between 1 and 5");
        assert_eq!(err.to_string(), "Severity must be between 1 and 5");
        assert!(err.source.is_none());
    }

    #[test]
    fn invalid_credentials_message_does_not_reveal_which_part_failed() {
        assert_eq!(Error::invalid_credentials().to_string(), "Invalid credentials");
    }

    #[test]
    fn connection_errors_are_system_errors() {
        let err: Error = DbErr::Custom("connection reset".to_string()).into();
        assert_eq!(err.error_kind, EntityApiErrorKind::SystemError);
    }

    #[test]
    fn missing_records_map_to_not_found() {
        let err: Error = DbErr::RecordNotFound("cases".to_string()).into();
        assert_eq!(err.error_kind, EntityApiErrorKind::RecordNotFound);
    }
}
