//! Strategy error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MmError {
    /// Empty book handed to price derivation.
    #[error("Cannot derive a price from an empty book side")]
    InvalidBook,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The exchange never confirmed or refused a cancel within the
    /// configured window.
    #[error("Timed out waiting for cancel confirmation")]
    CancelTimeout,

    #[error(transparent)]
    Feed(#[from] bfmm_feed::FeedError),

    #[error(transparent)]
    Exchange(#[from] bfmm_exchange::ExchangeError),
}

pub type MmResult<T> = Result<T, MmError>;
