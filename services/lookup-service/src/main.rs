use anyhow::Result;
use common::config::AppConfig;
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};
use std::net::SocketAddr;

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();
    init_telemetry(TelemetryConfig::from_settings("lookup-service", &config.telemetry))?;

    tracing::info!("Starting order lookup service...");
    tracing::info!(
        "Distributed tracing: {}",
        if config.telemetry.enable_jaeger { "enabled" } else { "disabled" }
    );

    tracing::info!("Configuration:");
    tracing::info!("  Database: {}", if config.database.is_some() { "configured" } else { "none" });
    tracing::info!(
        "  Cache: {}",
        config
            .cache
            .as_ref()
            .map(|c| format!("{}s TTL", c.ttl_seconds))
            .unwrap_or_else(|| "none".to_string())
    );
    tracing::info!(
        "  Order source: {}",
        config.source.as_ref().map(|s| s.base_url.as_str()).unwrap_or("none")
    );
    tracing::info!("  API key gate: {}", if config.api_key.is_some() { "on" } else { "off" });
    tracing::info!("  Port: {}", config.port);

    let state = AppState::from_config(&config).await;
    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Lookup service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    shutdown_telemetry();

    Ok(())
}
