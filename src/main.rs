// src/main.rs

use anyhow::Result;
use tracing::{info, warn};

use spot_guard::config::Config;
use spot_guard::exchange::{BinanceClient, Exchange};
use spot_guard::{logger, server};

#[tokio::main]
async fn main() -> Result<()> {
    // 1) config and logger; missing credentials stop us here
    let cfg = Config::load()?;
    logger::init(&cfg);

    // 2) exchange client + ping
    let exchange = BinanceClient::from_config(&cfg)?;
    match exchange.ping().await {
        Ok(()) => info!(base_url = %exchange.base_url(), "Exchange reachable"),
        Err(e) => warn!(base_url = %exchange.base_url(), "Exchange ping failed: {}", e),
    }

    // 3) HTTP API
    server::run(&cfg, exchange).await
}
