//! Exchange error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The exchange refused the order. Body carries the error payload.
    #[error("Order rejected: HTTP {status}: {body}")]
    OrderRejected { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
