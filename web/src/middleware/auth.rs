use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_login::AuthSession;

/// Authentication middleware that returns 401 Unauthorized for unauthenticated requests.
///
/// This replaces axum-login's `login_required!` macro which redirects to login URLs.
/// For API endpoints, we want to return proper HTTP status codes instead of redirects.
pub async fn require_auth(
    auth_session: AuthSession<domain::hr_user::Backend>,
    request: Request,
    next: Next,
) -> Response {
    match auth_session.user {
        Some(_user) => next.run(request).await,
        None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware::from_fn, routing::get, Router};
    use axum_login::{
        tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use chrono::Utc;
    use clap::Parser;
    use domain::hr_user::Backend;
    use domain::{hr_users, roles::Role, Id};
    use password_auth::generate_hash;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use time::Duration;
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "authenticated"
    }

    fn hr_user() -> hr_users::Model {
        hr_users::Model {
            id: Id::new_v4(),
            email: "hr@company.com".to_string(),
            name: "HR Manager".to_string(),
            role: Role::HrManager,
            password: generate_hash("demo123"),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn app(db: Arc<DatabaseConnection>) -> Router {
        let config = Config::parse_from(["feedback_platform"]);
        let app_state = crate::AppState::new(config, &db);

        let session_store = MemoryStore::default();
        let session_layer = SessionManagerLayer::new(session_store)
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::days(1)))
            .with_always_save(true);

        let backend = Backend::new(&db);
        let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

        Router::new()
            .route(
                "/login",
                axum::routing::post(crate::controller::hr_session_controller::login),
            )
            .merge(
                Router::new()
                    .route("/test", get(test_handler))
                    .route_layer(from_fn(require_auth)),
            )
            .layer(auth_layer)
            .with_state(app_state)
    }

    fn login_request(password: &str) -> Request<Body> {
        Request::builder()
            .uri("/login")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!("email=hr%40company.com&password={password}")))
            .unwrap()
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_no_session() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response: Response = app(db).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_invalid_session_cookie() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let request = Request::builder()
            .uri("/test")
            .header("cookie", "id=invalid-session-id")
            .body(Body::empty())
            .unwrap();
        let response: Response = app(db).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected_with_401() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[hr_user()]])
                .into_connection(),
        );

        let response = app(db).oneshot(login_request("wrong")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_allows_authenticated_request_to_proceed() {
        let test_user = hr_user();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user.clone()]]) // authenticate by email
                .append_query_results([[test_user.clone()]]) // get_user after login
                .append_query_results([[test_user.clone()]]) // session user lookup on the protected route
                .into_connection(),
        );
        let app = app(db);

        let login_response = app.clone().oneshot(login_request("demo123")).await.unwrap();
        assert_eq!(login_response.status(), StatusCode::OK);

        let cookie = login_response
            .headers()
            .get("set-cookie")
            .and_then(|c| c.to_str().ok())
            .expect("Login should return session cookie");

        let protected_request = Request::builder()
            .uri("/test")
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap();

        let response: Response = app.oneshot(protected_request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn manual_ack_route_requires_a_session() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let config = Config::parse_from(["feedback_platform"]);
        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        let auth_layer = AuthManagerLayerBuilder::new(Backend::new(&db), session_layer).build();
        let app = crate::router::define_routes(crate::AppState::new(config, &db)).layer(auth_layer);

        let request = Request::builder()
            .uri("/acks")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"conversationId":"conv_1"}"#))
            .unwrap();
        let response: Response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
