//! eventmap-api server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use eventmap_api::app_state::AppState;
use eventmap_api::auth::JwtAuthenticator;
use eventmap_api::build_app;
use eventmap_api::config::{AppConfig, LogFormat};
use eventmap_api::persistence::{EventStore, PostgresEventStore};
use eventmap_api::shutdown::{Shutdown, wait_for_os_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting eventmap-api");
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    // Build persistence layer
    let store = if config.persistence_enabled {
        let pg = PostgresEventStore::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        EventStore::Postgres(pg)
    } else {
        EventStore::in_memory()
    };
    tracing::info!(backend = store.backend(), "event store ready");

    // Build application state
    let auth =
        JwtAuthenticator::with_secret(config.jwt_secret.as_bytes()).with_leeway(config.jwt_leeway_secs);
    let (shutdown, signal) = Shutdown::channel();
    let app_state = AppState::new(store, auth, signal);

    let app = build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = wait_for_os_signal().await {
                tracing::error!(error = %e, "signal handler failed");
            }
            tracing::info!("shutdown requested, closing event streams");
            shutdown.trigger();
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
