use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum_login::{
    tower_sessions::{Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use domain::ack::AckService;
use domain::hr_user::Backend;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::{ApiVersion, Config};
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
pub mod router;

pub use error::{Error, Result};

const SESSION_TABLE: &str = "authorized_sessions";

// Web-level state: the service infrastructure plus the ACK service, which lives in `domain`
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
    pub ack_service: Option<Arc<AckService>>,
}

impl AppState {
    pub fn new(app_config: Config, db: &Arc<DatabaseConnection>) -> Self {
        Self {
            database_connection: Arc::clone(db),
            config: app_config,
            ack_service: None,
        }
    }

    pub fn with_ack_service(mut self, ack_service: Arc<AckService>) -> Self {
        self.ack_service = Some(ack_service);
        self
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origin = if config.allows_any_origin() {
        // A wildcard cannot be combined with credentials, so echo the caller's origin back.
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {origin:?}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_methods([
            Method::DELETE,
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::POST,
            Method::PUT,
        ])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-version"),
            HeaderName::from_static(domain::webhook::SIGNATURE_HEADER),
        ])
        .allow_origin(allowed_origin)
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    info!(
        "Starting {} API (x-version {}) in {} mode",
        env!("CARGO_PKG_NAME"),
        ApiVersion::default_version(),
        app_state.config.runtime_env()
    );

    let session_store = PostgresStore::new(
        app_state
            .db_conn_ref()
            .get_postgres_connection_pool()
            .to_owned(),
    )
    .with_schema_name(service::DB_SCHEMA)
    .map_err(std::io::Error::other)?
    .with_table_name(SESSION_TABLE)
    .map_err(std::io::Error::other)?;

    session_store
        .migrate()
        .await
        .map_err(std::io::Error::other)?;

    // Check for expired sessions every minute
    let deletion_task = tokio::task::spawn(
        session_store
            .clone()
            .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
    );

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            i64::try_from(app_state.config.backend_session_expiry_seconds).unwrap_or(i64::MAX),
        )));

    let backend = Backend::new(&app_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);
    let listener = TcpListener::bind(&server_url).await?;
    info!("Server listening on {server_url}");

    let cors = cors_layer(&app_state.config);

    axum::serve(
        listener,
        router::define_routes(app_state)
            .layer(cors)
            .layer(auth_layer)
            .into_make_service(),
    )
    .await?;

    deletion_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn explicit_origins_skip_invalid_entries() {
        let config = Config::parse_from([
            "feedback_platform",
            "--allowed-origins",
            "https://hr.example.com,bad\norigin",
        ]);

        // Building the layer must not panic on the invalid origin.
        let _ = cors_layer(&config);
        assert!(!config.allows_any_origin());
    }
}
