//! Core domain types for the bfmm market-making bot.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Size`: precision-safe numeric types (integer yen / decimal BTC)
//! - `Side`, `TimeInForce`, `AcceptanceId`: order enums and identifiers
//! - `PriceLevel`, `Board`: depth-sorted order book snapshot
//! - `OrderEvent`, `OrderEventType`: child-order event notifications
//! - `Position`: a held position record

pub mod book;
pub mod decimal;
pub mod error;
pub mod event;
pub mod order;
pub mod position;

pub use book::{Board, BookSide, PriceLevel};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use event::{OrderEvent, OrderEventType};
pub use order::{AcceptanceId, Side, TimeInForce};
pub use position::Position;
