//! Order book assembly.
//!
//! Maintains both sides as price-keyed maps, applying full snapshots and
//! incremental diffs, and publishes immutable best-first `Board` snapshots.

use crate::error::FeedResult;
use crate::parser::RawBoard;
use bfmm_core::{Board, Price, PriceLevel, Size};
use std::collections::BTreeMap;

/// Mutable book state fed by the snapshot and diff channels.
#[derive(Debug, Default)]
pub struct OrderBook {
    /// Ask side, keyed ascending (best = first).
    asks: BTreeMap<i64, Size>,
    /// Bid side, keyed ascending (best = last).
    bids: BTreeMap<i64, Size>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole book from a snapshot payload.
    pub fn apply_snapshot(&mut self, raw: &RawBoard) -> FeedResult<()> {
        self.asks.clear();
        self.bids.clear();
        self.apply_diff(raw)
    }

    /// Apply an incremental update. A level with size 0 is removed.
    pub fn apply_diff(&mut self, raw: &RawBoard) -> FeedResult<()> {
        for level in &raw.asks {
            let price = Price::from_decimal(level.price)?;
            if level.size.is_zero() {
                self.asks.remove(&price.inner());
            } else {
                self.asks.insert(price.inner(), Size::new(level.size));
            }
        }
        for level in &raw.bids {
            let price = Price::from_decimal(level.price)?;
            if level.size.is_zero() {
                self.bids.remove(&price.inner());
            } else {
                self.bids.insert(price.inner(), Size::new(level.size));
            }
        }
        Ok(())
    }

    /// Whether any snapshot content has been applied.
    pub fn is_seeded(&self) -> bool {
        !self.asks.is_empty() || !self.bids.is_empty()
    }

    /// Build an immutable best-first snapshot.
    pub fn snapshot(&self) -> Board {
        let asks = self
            .asks
            .iter()
            .map(|(&price, &size)| PriceLevel::new(Price::new(price), size))
            .collect();
        let bids = self
            .bids
            .iter()
            .rev()
            .map(|(&price, &size)| PriceLevel::new(Price::new(price), size))
            .collect();
        Board::new(asks, bids)
    }
}
