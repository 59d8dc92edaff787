// src/api/router.rs
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::exchange::Exchange;
use crate::risk::TradingPolicy;

/// Shared by all handlers; nothing in here is mutated after startup.
pub struct AppState<E> {
    pub exchange: Arc<E>,
    pub policy: Arc<TradingPolicy>,
}

impl<E: Exchange> AppState<E> {
    pub fn new(exchange: Arc<E>, policy: TradingPolicy) -> Self {
        AppState {
            exchange,
            policy: Arc::new(policy),
        }
    }
}

pub fn create_router<E: Exchange + 'static>(state: Arc<AppState<E>>) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/price/{symbol}", get(handlers::price::<E>))
        .route("/balance", get(handlers::balance::<E>))
        .route("/order", post(handlers::create_order::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
