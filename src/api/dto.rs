// src/api/dto.rs
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub symbol: String,
    pub price: f64,
}

/// Free amount per asset, funded assets only.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balances: BTreeMap<String, f64>,
}

/// Wraps the exchange answer untouched.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub exchange_response: Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
