//! Till API Server
//!
//! Main entry point for the cash register backend. Serves the HTTP API and
//! runs the expired-export sweep until shutdown.

mod purge;

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use till_api::{AppState, create_router};
use till_core::storage::{StorageConfig, StorageService};
use till_db::connect;
use till_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,till=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let storage = StorageService::from_config(
        StorageConfig::new(config.storage.provider.clone())
            .with_io_timeout(Duration::from_secs(config.storage.io_timeout_secs)),
    )?;
    info!(provider = storage.provider_name(), "Blob storage configured");

    let state = AppState::new(db, storage, &config)?;
    if config.notifications.recipient.is_none() {
        info!("No notification recipient configured, closing statements will not be mailed");
    }

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(purge::run(
        state.exports.clone(),
        Duration::from_secs(config.exports.purge_interval_secs),
        shutdown.clone(),
    ));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    sweeper.await?;
    info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C and cancels background work.
async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("Shutdown requested");
    token.cancel();
}
