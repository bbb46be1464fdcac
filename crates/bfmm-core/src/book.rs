//! Order book snapshot types.
//!
//! A `Board` is the depth-sorted view of both sides, replaced atomically
//! by the feed on every update. Consumers only ever read a whole board,
//! never a level in isolation across updates.

use crate::decimal::{Price, Size};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the book a sequence of levels belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Ask,
    Bid,
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ask => write!(f, "ask"),
            Self::Bid => write!(f, "bid"),
        }
    }
}

/// One resting level of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Price,
    pub size: Size,
}

impl PriceLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// Depth-sorted board snapshot.
///
/// Both sides are ordered best-first: asks ascending, bids descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub asks: Vec<PriceLevel>,
    pub bids: Vec<PriceLevel>,
    /// Timestamp when this snapshot was assembled.
    pub received_at: DateTime<Utc>,
}

impl Board {
    pub fn new(asks: Vec<PriceLevel>, bids: Vec<PriceLevel>) -> Self {
        Self {
            asks,
            bids,
            received_at: Utc::now(),
        }
    }

    /// The levels for one side, best-first.
    pub fn side(&self, side: BookSide) -> &[PriceLevel] {
        match side {
            BookSide::Ask => &self.asks,
            BookSide::Bid => &self.bids,
        }
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    /// Normalized spread: `(best_ask - best_bid) / best_bid`.
    ///
    /// Returns None if either side is empty or the best bid is zero.
    pub fn spread(&self) -> Option<Decimal> {
        let ask = self.best_ask()?;
        let bid = self.best_bid()?;
        if bid.inner() == 0 {
            return None;
        }
        Some((ask.as_decimal() - bid.as_decimal()) / bid.as_decimal())
    }

    /// Whether both sides carry at least one level.
    pub fn is_two_sided(&self) -> bool {
        !self.asks.is_empty() && !self.bids.is_empty()
    }

    /// Age of this snapshot in milliseconds.
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.received_at).num_milliseconds()
    }
}
