// src/utils.rs

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds `value` to `decimals` fractional digits (banker's rounding).
pub fn round_fixed(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
}

/// Renders `value` with exactly `decimals` fractional digits, rounded as in [`round_fixed`].
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round_fixed(value, decimals))
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
