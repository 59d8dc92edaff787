// src/server.rs

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::exchange::Exchange;

/// Serves the proxy API on `cfg.listen_addr` until Ctrl-C.
pub async fn run<E>(cfg: &Config, exchange: E) -> Result<()>
where
    E: Exchange + 'static,
{
    let state = Arc::new(AppState::new(Arc::new(exchange), cfg.policy.clone()));
    let app = create_router(state);

    let listener = TcpListener::bind(cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!(addr = %cfg.listen_addr, "Trading proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Trading proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        // without a signal handler the server simply runs until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
