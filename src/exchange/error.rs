// src/exchange/error.rs

use thiserror::Error;

/// Outcome of a failed upstream call. Never retried here; callers decide how
/// to present it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The exchange answered with status >= 400. `body` is the raw response text.
    #[error("upstream rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// No response: connect failure, broken transfer, or timeout.
    #[error("upstream unreachable: {reason}")]
    Unreachable { timed_out: bool, reason: String },

    /// 2xx answer that isn't the JSON we expected.
    #[error("unexpected upstream payload: {0}")]
    Decode(String),

    #[error("invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ExchangeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Unreachable { timed_out: true, .. })
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        ExchangeError::Unreachable {
            timed_out: e.is_timeout(),
            reason: e.to_string(),
        }
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(e: url::ParseError) -> Self {
        ExchangeError::InvalidEndpoint(e.to_string())
    }
}
