//! HTTP server initialization and runtime setup.
//!
//! Selects the catalog store, applies migrations, and runs the Axum server
//! until Ctrl+C.

use crate::config::Config;
use crate::domain::repositories::CatalogStore;
use crate::infrastructure::persistence::{MemoryCatalogStore, PgCatalogStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the store the configuration asks for.
///
/// With a database URL this connects the pool, runs migrations, and starts
/// the change listener. Without one it returns an empty in-memory store.
///
/// # Errors
///
/// Returns an error if the database is configured but unreachable, if
/// migrations fail, or if the change listener cannot be set up.
pub async fn build_store(config: &Config) -> Result<Arc<dyn CatalogStore>> {
    let Some(ref database_url) = config.database_url else {
        tracing::warn!("No database configured, entries will not survive a restart");
        return Ok(Arc::new(MemoryCatalogStore::new()));
    };

    let pool = config
        .pool
        .options()
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let store = PgCatalogStore::connect(Arc::new(pool))
        .await
        .context("Failed to start catalog change listener")?;

    Ok(Arc::new(store))
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be set up
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = build_store(&config).await?;

    let state = AppState::new(store).with_notify_dismiss(config.notify_dismiss());

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
