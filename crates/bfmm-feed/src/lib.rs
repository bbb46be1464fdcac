//! Market data aggregation for bfmm.
//!
//! Turns raw realtime channel payloads into typed events, assembles the
//! order book from snapshot + diff channels, owns the shared `MarketState`
//! (latest board, positions, order-event broadcast), and provides the
//! single-resolution `EventWatcher` used by the strategy to track order
//! outcomes.

pub mod book;
pub mod error;
pub mod market_state;
pub mod parser;
pub mod watcher;

pub use book::OrderBook;
pub use error::{FeedError, FeedResult};
pub use market_state::MarketState;
pub use parser::{FeedEvent, MessageParser, RawBoard, RawLevel};
pub use watcher::{EventMatch, EventWatcher};
