// src/api/handlers.rs
use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::AppState;
use super::dto::{BalanceResponse, OrderResponse, PingResponse, PriceResponse};
use super::error::ApiError;
use super::extract::ApiJson;
use crate::exchange::Exchange;
use crate::models::{OrderRequest, normalize_symbol};

/// GET /ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

/// GET /price/{symbol}
pub async fn price<E: Exchange>(
    State(state): State<Arc<AppState<E>>>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceResponse>, ApiError> {
    let symbol = normalize_symbol(&symbol);
    let ticker = state.exchange.ticker_price(&symbol).await?;
    let price = ticker
        .price
        .to_f64()
        .ok_or_else(|| ApiError::bad_gateway(format!("price {} is not representable", ticker.price)))?;

    Ok(Json(PriceResponse { symbol, price }))
}

/// GET /balance
pub async fn balance<E: Exchange>(
    State(state): State<Arc<AppState<E>>>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = state.exchange.account().await?;

    let mut balances = BTreeMap::new();
    for entry in account.funded() {
        let free = entry.free.to_f64().ok_or_else(|| {
            ApiError::bad_gateway(format!("balance {} of {} is not representable", entry.free, entry.asset))
        })?;
        balances.insert(entry.asset.clone(), free);
    }

    Ok(Json(BalanceResponse { balances }))
}

/// POST /order
///
/// Unparseable bodies and validation failures end here with 400; only a
/// validated order is signed and sent, exactly once.
pub async fn create_order<E: Exchange>(
    State(state): State<Arc<AppState<E>>>,
    ApiJson(order): ApiJson<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let validated = state.policy.validate(&order)?;
    info!(
        symbol = %validated.symbol,
        side = %validated.side,
        order_type = %validated.order_type,
        "Submitting order"
    );

    let exchange_response = state.exchange.place_order(validated.into_params()).await?;
    info!("Order accepted by exchange");

    Ok(Json(OrderResponse { exchange_response }))
}
