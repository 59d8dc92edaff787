// src/exchange/types.rs
use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /api/v3/ticker/price`
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// `GET /api/v3/account`, only the parts the proxy reads.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AccountInfo {
    #[serde(default)]
    pub balances: Vec<AssetBalance>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AssetBalance {
    pub asset: String,
    pub free: Decimal,
    #[serde(default)]
    pub locked: Decimal,
}

impl AccountInfo {
    /// Balances with a strictly positive free amount.
    pub fn funded(&self) -> impl Iterator<Item = &AssetBalance> {
        self.balances.iter().filter(|b| b.free > Decimal::ZERO)
    }
}
