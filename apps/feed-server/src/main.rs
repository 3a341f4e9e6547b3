//! # Feed API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry);

    // Load configuration
    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Feed API Server on {}:{}",
        config.host,
        config.port
    );

    // Build application state
    let state = AppState::new(&config, &telemetry.service_name).await;

    // Start HTTP server
    let origins = config.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::cors::cors(&origins))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
