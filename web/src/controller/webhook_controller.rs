//! Controller for voice-vendor webhook deliveries.
//!
//! Deliveries are authenticated by the `ElevenLabs-Signature` header when a webhook secret
//! is configured, not by a session.

use crate::{AppState, Error};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use domain::webhook::{self as WebhookApi, WebhookReply, SIGNATURE_HEADER};
use domain::Id;
use log::*;

/// POST a voice-vendor event (conversation ended/started/message, transcription status)
#[utoipa::path(
    post,
    path = "/webhooks/elevenlabs",
    request_body(content = String, description = "Vendor event JSON", content_type = "application/json"),
    params(
        ("ElevenLabs-Signature" = Option<String>, Header, description = "t=<unix seconds>,v0=<hex HMAC-SHA256>")
    ),
    responses(
        (status = 200, description = "Delivery processed, or acknowledged as a no-op", body = domain::webhook::WebhookReply),
        (status = 400, description = "Body is not JSON", body = domain::webhook::WebhookReply),
        (status = 401, description = "Missing or invalid signature", body = domain::webhook::WebhookReply),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Processing failed", body = domain::webhook::WebhookReply)
    )
)]
pub async fn elevenlabs_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(err) = WebhookApi::verify_signature(&app_state.config, signature, &body, Utc::now())
    {
        warn!("Rejected webhook delivery: {err}");
        return reply_with_error(Error::from(err));
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("Webhook body is not valid JSON: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookReply::failure("Malformed JSON payload")),
            );
        }
    };

    let request_id = Id::new_v4();
    debug!("Webhook delivery {request_id} received");

    match WebhookApi::process_delivery(
        app_state.db_conn_ref(),
        &app_state.config,
        app_state.ack_service.as_ref(),
        request_id,
        payload,
    )
    .await
    {
        Ok(reply) => (StatusCode::OK, Json(reply)),
        Err(err) => reply_with_error(Error::from(err)),
    }
}

fn reply_with_error(err: Error) -> (StatusCode, Json<WebhookReply>) {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Webhook processing failed: {err}");
    }
    (status, Json(WebhookReply::failure(err.public_message())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use clap::Parser;
    use sea_orm::DatabaseConnection;
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "wsec_test";

    fn app() -> Router {
        let config = Config::parse_from(["feedback_platform"])
            .set_elevenlabs_webhook_secret(Some(SECRET.to_string()));
        let db = Arc::new(DatabaseConnection::Disconnected);
        Router::new()
            .route("/webhooks/elevenlabs", post(elevenlabs_webhook))
            .with_state(AppState::new(config, &db))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    #[tokio::test]
    async fn unsigned_deliveries_are_rejected_when_a_secret_is_set() {
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/elevenlabs")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"type":"post_call_transcription"}"#))
            .unwrap();

        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "error": "Invalid signature" })
        );
    }

    #[tokio::test]
    async fn signed_but_malformed_bodies_are_a_bad_request() {
        let body = b"{not json";
        let header = WebhookApi::signature::sign(SECRET, Utc::now().timestamp(), body).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/webhooks/elevenlabs")
            .header(SIGNATURE_HEADER, header)
            .body(Body::from(body.to_vec()))
            .unwrap();

        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn non_post_methods_are_not_allowed() {
        let request = Request::builder()
            .method("GET")
            .uri("/webhooks/elevenlabs")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
