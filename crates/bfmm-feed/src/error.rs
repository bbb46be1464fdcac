//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// No board snapshot has been received yet; callers must wait for
    /// warm-up, this is not a fault once the feed is live.
    #[error("No market data received yet")]
    NoMarketData,

    /// The position set violates an external invariant. Signals corruption
    /// upstream, not a recoverable condition.
    #[error("Position invariant violated: {0}")]
    InvariantViolation(String),

    /// Watcher result requested before resolution.
    #[error("Watcher not resolved yet")]
    NotReady,

    /// The order event stream closed before the watcher resolved.
    #[error("Order event stream closed")]
    StreamClosed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] bfmm_core::CoreError),
}

pub type FeedResult<T> = Result<T, FeedError>;
