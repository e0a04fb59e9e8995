use domain::ack::{AckService, ConversationTracker};
use domain::gateway::elevenlabs::ElevenLabsClient;
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting up...");

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let mut app_state = web::AppState::new(config.clone(), &db);

    // ACK generation needs the voice gateway; without an API key the rest of the API still runs.
    match ElevenLabsClient::new(&config) {
        Ok(client) => {
            let tracker = Arc::new(ConversationTracker::new());
            let ack_service = Arc::new(AckService::new(&db, Arc::new(client), tracker, &config));
            Arc::clone(&ack_service).spawn_time_trigger_loop();
            app_state = app_state.with_ack_service(ack_service);
        }
        Err(e) => warn!("ACK generation disabled: {e}"),
    }

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with error: {e}");
        std::process::exit(1);
    }
}
