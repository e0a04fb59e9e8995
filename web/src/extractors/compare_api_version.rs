use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;
use service::config::ApiVersion;

/// Rejects requests whose `x-version` header is missing or names an unsupported API version.
pub(crate) struct CompareApiVersion(pub ApiVersion);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let requested = parts
            .headers
            .get(ApiVersion::field_name())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Missing {} header", ApiVersion::field_name()),
                )
            })?;

        match ApiVersion::versions()
            .into_iter()
            .find(|version| *version == requested)
        {
            Some(version) => Ok(CompareApiVersion(ApiVersion::new(version))),
            None => {
                warn!("Rejected unsupported API version {requested:?}");
                Err((
                    StatusCode::BAD_REQUEST,
                    format!("Unsupported API version {requested}"),
                ))
            }
        }
    }
}
