// src/risk.rs

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::exchange::QueryParams;
use crate::models::{normalize_symbol, OrderRequest, OrderSide, OrderType};
use crate::utils::{format_fixed, round_fixed};

pub const QUOTE_DECIMALS: u32 = 2;
pub const QUANTITY_DECIMALS: u32 = 6;
pub const PRICE_DECIMALS: u32 = 2;
pub const LIMIT_TIME_IN_FORCE: &str = "GTC";

/// Why an order was refused before reaching the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error("symbol {symbol} is not permitted; allowed symbols: {}", .allowed.join(", "))]
    SymbolNotPermitted { symbol: String, allowed: Vec<String> },

    #[error("confirmation missing: resend the order with confirmed=true")]
    ConfirmationMissing,

    #[error("MARKET BUY requires a positive quote_amount")]
    MissingQuoteAmount,

    #[error("quote_amount {requested} exceeds the limit of {limit} USDT per order")]
    QuoteAmountOverLimit { requested: Decimal, limit: Decimal },

    #[error("MARKET SELL requires a positive quantity")]
    MissingQuantity,

    #[error("LIMIT orders require a positive quantity and price")]
    MissingLimitFields,
}

/// An order that passed every check, with its exchange parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    params: QueryParams,
}

impl ValidatedOrder {
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn into_params(self) -> QueryParams {
        self.params
    }
}

/// Allow-list and notional cap applied to every incoming order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPolicy {
    allowed_symbols: BTreeSet<String>,
    max_quote_trade: Decimal,
}

impl TradingPolicy {
    pub fn new<I, S>(allowed_symbols: I, max_quote_trade: Decimal) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_symbols = allowed_symbols
            .into_iter()
            .map(|s| normalize_symbol(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            allowed_symbols,
            max_quote_trade,
        }
    }

    pub fn allowed_symbols(&self) -> &BTreeSet<String> {
        &self.allowed_symbols
    }

    pub fn max_quote_trade(&self) -> Decimal {
        self.max_quote_trade
    }

    pub fn is_allowed(&self, symbol: &str) -> bool {
        self.allowed_symbols.contains(&normalize_symbol(symbol))
    }

    /// Runs the checks in order; the first failure wins.
    ///
    /// 1. symbol in the allow-list
    /// 2. `confirmed == true`
    /// 3. fields required by the (type, side) shape, and the quote cap for MARKET BUY
    pub fn validate(&self, order: &OrderRequest) -> Result<ValidatedOrder, OrderRejection> {
        let symbol = normalize_symbol(&order.symbol);
        if !self.allowed_symbols.contains(&symbol) {
            warn!(%symbol, "Order rejected: symbol not in allow-list");
            return Err(OrderRejection::SymbolNotPermitted {
                symbol,
                allowed: self.allowed_symbols.iter().cloned().collect(),
            });
        }

        if !order.confirmed {
            warn!(%symbol, "Order rejected: confirmation missing");
            return Err(OrderRejection::ConfirmationMissing);
        }

        let mut params = QueryParams::new()
            .with("symbol", symbol.as_str())
            .with("side", order.side.as_str())
            .with("type", order.order_type.as_str());

        match (order.order_type, order.side) {
            (OrderType::Market, OrderSide::Buy) => {
                let quote = positive(order.quote_amount, QUOTE_DECIMALS).ok_or(OrderRejection::MissingQuoteAmount)?;
                if quote > self.max_quote_trade {
                    warn!(%symbol, %quote, limit = %self.max_quote_trade, "Order rejected: over quote limit");
                    return Err(OrderRejection::QuoteAmountOverLimit {
                        requested: quote,
                        limit: self.max_quote_trade,
                    });
                }
                params.push("quoteOrderQty", format_fixed(quote, QUOTE_DECIMALS));
            }
            (OrderType::Market, OrderSide::Sell) => {
                let qty = positive(order.quantity, QUANTITY_DECIMALS).ok_or(OrderRejection::MissingQuantity)?;
                params.push("quantity", format_fixed(qty, QUANTITY_DECIMALS));
            }
            (OrderType::Limit, _) => {
                let (qty, price) = positive(order.quantity, QUANTITY_DECIMALS)
                    .zip(positive(order.price, PRICE_DECIMALS))
                    .ok_or(OrderRejection::MissingLimitFields)?;
                params.push("quantity", format_fixed(qty, QUANTITY_DECIMALS));
                params.push("price", format_fixed(price, PRICE_DECIMALS));
                params.push("timeInForce", LIMIT_TIME_IN_FORCE);
            }
        }

        debug!(%symbol, side = %order.side, order_type = %order.order_type, "Order passed risk checks");
        Ok(ValidatedOrder {
            symbol,
            side: order.side,
            order_type: order.order_type,
            params,
        })
    }
}

/// Keeps `value` only if it is still above zero once rounded to the scale it is sent at.
fn positive(value: Option<Decimal>, decimals: u32) -> Option<Decimal> {
    value.filter(|v| round_fixed(*v, decimals) > Decimal::ZERO)
}
