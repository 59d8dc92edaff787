// src/exchange/mod.rs

pub mod binance;
pub mod error;
pub mod signer;
pub mod types;

pub use binance::BinanceClient;
pub use error::ExchangeError;
pub use signer::{QueryParams, RequestSigner, SignedQuery};
pub use types::{AccountInfo, AssetBalance, TickerPrice};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const PING_PATH: &str = "/api/v3/ping";
pub const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";
pub const ACCOUNT_PATH: &str = "/api/v3/account";
pub const ORDER_PATH: &str = "/api/v3/order";

/// Transport capability towards the exchange REST API.
///
/// `get`/`post` are the only calls an implementation has to provide; the
/// typed endpoint helpers are built on top of them, so a fake transport in
/// tests sees exactly the paths and parameters the real client would send.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn get(&self, path: &str, params: QueryParams, signed: bool)
        -> Result<Value, ExchangeError>;

    async fn post(&self, path: &str, params: QueryParams, signed: bool)
        -> Result<Value, ExchangeError>;

    /// GET /api/v3/ping
    async fn ping(&self) -> Result<(), ExchangeError> {
        self.get(PING_PATH, QueryParams::new(), false).await?;
        Ok(())
    }

    /// GET /api/v3/ticker/price?symbol=...
    async fn ticker_price(&self, symbol: &str) -> Result<TickerPrice, ExchangeError> {
        let params = QueryParams::new().with("symbol", symbol);
        let raw = self.get(TICKER_PRICE_PATH, params, false).await?;
        decode(raw)
    }

    /// GET /api/v3/account (signed)
    async fn account(&self) -> Result<AccountInfo, ExchangeError> {
        let raw = self.get(ACCOUNT_PATH, QueryParams::new(), true).await?;
        decode(raw)
    }

    /// POST /api/v3/order (signed). The exchange answer is returned untouched.
    async fn place_order(&self, params: QueryParams) -> Result<Value, ExchangeError> {
        self.post(ORDER_PATH, params, true).await
    }
}

/// Typed view of an upstream payload; errors name the offending JSON path.
pub fn decode<T: DeserializeOwned>(raw: Value) -> Result<T, ExchangeError> {
    serde_path_to_error::deserialize(raw).map_err(|e| ExchangeError::Decode(e.to_string()))
}
