//! Signed REST order entry for bfmm.
//!
//! Implements the two private endpoints the strategy needs, limit order
//! placement and cancellation, behind the `OrderApi` trait so the quote
//! lifecycle can be tested against mocks.

pub mod api;
pub mod client;
pub mod error;

pub use api::OrderApi;
pub use client::BitflyerClient;
pub use error::{ExchangeError, ExchangeResult};
