// src/api/mod.rs

mod dto;
mod error;
mod extract;
mod handlers;
mod router;

pub use dto::{BalanceResponse, ErrorResponse, OrderResponse, PingResponse, PriceResponse};
pub use error::ApiError;
pub use extract::ApiJson;
pub use router::{create_router, AppState};
