// src/config.rs
use anyhow::{bail, Context, Result};
use config::{Config as Loader, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

use crate::risk::TradingPolicy;

/// Raw keys as they appear in the environment / `Proxy.toml` (lower-cased).
#[derive(Deserialize, Debug, Clone)]
struct RawConfig {
    // Binance
    #[serde(default)]
    binance_key: String,
    #[serde(default)]
    binance_secret: String,
    #[serde(default = "default_base_url")]
    base_url: String,

    // Risk
    #[serde(default = "default_allowed_symbols")]
    allowed_symbols: String,
    #[serde(default = "default_max_quote_trade_usdt")]
    max_quote_trade_usdt: Decimal,

    // Server
    #[serde(default = "default_listen_addr")]
    listen_addr: String,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

fn default_base_url() -> String { "https://testnet.binance.vision".into() }
fn default_allowed_symbols() -> String { "BTCUSDT,ETHUSDT".into() }
fn default_max_quote_trade_usdt() -> Decimal { Decimal::ONE_HUNDRED }
fn default_listen_addr() -> String { "127.0.0.1:8000".into() }
fn default_request_timeout_secs() -> u64 { 15 }

/// Process-wide settings. Built once at startup, read-only afterwards.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: Url,
    pub policy: TradingPolicy,
    pub listen_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("policy", &self.policy)
            .field("listen_addr", &self.listen_addr)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// `.env` → optional TOML file (`PROXY_CONFIG`, default `Proxy.toml`) → environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let file = env::var("PROXY_CONFIG").unwrap_or_else(|_| "Proxy.toml".into());
        let loader = Loader::builder()
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::default())
            .build()?;
        Self::from_loader(loader)
    }

    pub fn from_loader(loader: Loader) -> Result<Self> {
        let raw: RawConfig = loader
            .try_deserialize()
            .context("failed to read proxy configuration")?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let api_key = raw.binance_key.trim().to_string();
        let api_secret = raw.binance_secret.trim().to_string();
        if api_key.is_empty() || api_secret.is_empty() {
            bail!("BINANCE_KEY and BINANCE_SECRET must be set (environment or .env)");
        }

        let base_url = Url::parse(raw.base_url.trim())
            .with_context(|| format!("invalid BASE_URL `{}`", raw.base_url))?;

        let policy = TradingPolicy::new(raw.allowed_symbols.split(','), raw.max_quote_trade_usdt);
        if policy.allowed_symbols().is_empty() {
            bail!("ALLOWED_SYMBOLS must name at least one symbol");
        }
        if policy.max_quote_trade() <= Decimal::ZERO {
            bail!(
                "MAX_QUOTE_TRADE_USDT must be positive, got {}",
                policy.max_quote_trade()
            );
        }

        let listen_addr: SocketAddr = raw
            .listen_addr
            .parse()
            .with_context(|| format!("invalid LISTEN_ADDR `{}`", raw.listen_addr))?;

        if raw.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            api_key,
            api_secret,
            base_url,
            policy,
            listen_addr,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
        })
    }
}
