//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("BITFLYER_API_KEY / BITFLYER_API_SECRET not set")]
    MissingCredentials,

    #[error("WebSocket error: {0}")]
    Ws(#[from] bfmm_ws::WsError),

    #[error("Feed error: {0}")]
    Feed(#[from] bfmm_feed::FeedError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] bfmm_exchange::ExchangeError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] bfmm_mm::MmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
