// src/logger.rs

use crate::config::Config;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

/// Logging via tracing; level from RUST_LOG, INFO otherwise.
pub fn init(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::info!(
        base_url = %cfg.base_url,
        allowed = ?cfg.policy.allowed_symbols(),
        max_quote = %cfg.policy.max_quote_trade(),
        "Logger initialized"
    );
}
