use crate::{controller::health_check_controller, middleware::auth::require_auth, params, AppState};
use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};

use crate::controller::{
    ack_controller, case_controller, hr_interaction_controller, hr_session_controller,
    tracking_controller, webhook_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Employee Feedback Platform API"
        ),
        paths(
            ack_controller::create,
            case_controller::index,
            case_controller::read,
            case_controller::update_status,
            health_check_controller::health_check,
            hr_interaction_controller::create,
            hr_session_controller::login,
            hr_session_controller::logout,
            tracking_controller::read,
            tracking_controller::create_message,
            webhook_controller::elevenlabs_webhook,
        ),
        components(
            schemas(
                domain::ai_insights::Model,
                domain::cases::Model,
                domain::hr_interactions::Model,
                domain::hr_users::Model,
                domain::transcripts::Model,
                domain::case::CaseWithDetails,
                domain::case::TrackingView,
                domain::ack::AckResult,
                domain::webhook::WebhookReply,
                domain::hr_user::Credentials,
                params::ack::CreateParams,
                params::case::UpdateStatusParams,
                params::interaction::MessageParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "feedback_platform", description = "Anonymous Employee Feedback API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes(app_state.clone()))
        .merge(ack_routes(app_state.clone()))
        .merge(tracking_routes(app_state.clone()))
        .merge(hr_session_routes())
        .merge(hr_session_protected_routes())
        .merge(case_routes(app_state))
        // FIXME: protect the OpenAPI web UI
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Voice-vendor deliveries (no session; verified by webhook signature)
fn webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/webhooks/elevenlabs",
            post(webhook_controller::elevenlabs_webhook),
        )
        .with_state(app_state)
}

/// Manual ACKs are issued by a logged in HR user
fn ack_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/acks", post(ack_controller::create))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

/// Anonymous employee access by confirmation code
fn tracking_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/tracking/:code", get(tracking_controller::read))
        .route(
            "/tracking/:code/messages",
            post(tracking_controller::create_message),
        )
        .with_state(app_state)
}

fn hr_session_routes() -> Router {
    Router::new().route("/login", post(hr_session_controller::login))
}

fn hr_session_protected_routes() -> Router {
    Router::new()
        .route("/logout", get(hr_session_controller::logout))
        .route_layer(from_fn(require_auth))
}

fn case_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/cases", get(case_controller::index))
        .route("/cases/:id", get(case_controller::read))
        .route("/cases/:id/status", put(case_controller::update_status))
        .route(
            "/cases/:id/interactions",
            post(hr_interaction_controller::create),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/acks",
            "/cases",
            "/cases/{id}",
            "/cases/{id}/status",
            "/cases/{id}/interactions",
            "/health",
            "/login",
            "/logout",
            "/tracking/{code}",
            "/tracking/{code}/messages",
            "/webhooks/elevenlabs",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn ack_result_timestamps_render_as_date_time_strings() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let generated_at = &doc["components"]["schemas"]["AckResult"]["properties"]["generatedAt"];

        assert_eq!(generated_at["type"], "string");
        assert_eq!(generated_at["format"], "date-time");
    }
}
