//! Shared market state.
//!
//! Single container the strategy reads from: the latest assembled board,
//! the current position set, and the broadcast stream of child-order
//! events that watchers subscribe to.

use crate::error::{FeedError, FeedResult};
use bfmm_core::{Board, OrderEvent, OrderEventType, Position, Price, Side, Size};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::debug;

const ORDER_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Aggregated state for one symbol.
pub struct MarketState {
    board: RwLock<Option<Board>>,
    positions: RwLock<Vec<Position>>,
    order_events: broadcast::Sender<OrderEvent>,
    /// Maximum position records allowed per side.
    max_position: usize,
}

impl MarketState {
    pub fn new(max_position: usize) -> Self {
        let (order_events, _) = broadcast::channel(ORDER_EVENT_CHANNEL_CAPACITY);
        Self {
            board: RwLock::new(None),
            positions: RwLock::new(Vec::new()),
            order_events,
            max_position,
        }
    }

    /// Replace the current board atomically.
    pub fn publish_board(&self, board: Board) {
        *self.board.write() = Some(board);
    }

    /// Whether at least one board snapshot has arrived.
    pub fn has_board(&self) -> bool {
        self.board.read().is_some()
    }

    /// Latest board, or `NoMarketData` before warm-up.
    pub fn board(&self) -> FeedResult<Board> {
        self.board.read().clone().ok_or(FeedError::NoMarketData)
    }

    pub fn best_ask(&self) -> FeedResult<Price> {
        self.board()?.best_ask().ok_or(FeedError::NoMarketData)
    }

    pub fn best_bid(&self) -> FeedResult<Price> {
        self.board()?.best_bid().ok_or(FeedError::NoMarketData)
    }

    /// Relative spread `(ask - bid) / bid` of the latest board.
    pub fn spread(&self) -> FeedResult<Decimal> {
        self.board()?.spread().ok_or(FeedError::NoMarketData)
    }

    /// Replace the position set, e.g. from a REST reconciliation.
    pub fn set_positions(&self, positions: Vec<Position>) {
        *self.positions.write() = positions;
    }

    pub fn positions(&self) -> Vec<Position> {
        self.positions.read().clone()
    }

    /// Total held size on `side`.
    ///
    /// Errors with `InvariantViolation` when the number of records on that
    /// side exceeds the configured maximum.
    pub fn remaining_size(&self, side: Side) -> FeedResult<Size> {
        let positions = self.positions.read();
        let mut count = 0usize;
        let mut total = Size::ZERO;
        for position in positions.iter().filter(|p| p.side == side) {
            count += 1;
            total = total + position.size;
        }
        if count > self.max_position {
            return Err(FeedError::InvariantViolation(format!(
                "{count} {side} position records exceed maximum {}",
                self.max_position
            )));
        }
        Ok(total)
    }

    /// Subscribe to the child-order event stream.
    pub fn subscribe_order_events(&self) -> broadcast::Receiver<OrderEvent> {
        self.order_events.subscribe()
    }

    /// Net executions into the position set and broadcast every event.
    pub fn apply_order_events(&self, events: Vec<OrderEvent>) -> FeedResult<()> {
        for event in events {
            if event.event_type == OrderEventType::Execution {
                if let (Some(side), Some(price), Some(size)) =
                    (event.side, event.price, event.size)
                {
                    self.apply_execution(side, price, size)?;
                }
            }
            // No receivers yet is fine, the feed may outlive watchers.
            let _ = self.order_events.send(event);
        }
        Ok(())
    }

    /// Net a fill against opposite-side positions first; any remainder
    /// merges into the same-side record at a size-weighted entry price.
    fn apply_execution(&self, side: Side, price: Price, size: Size) -> FeedResult<()> {
        let mut positions = self.positions.write();
        let opposite = side.opposite();
        let mut remaining = size;

        let mut i = 0;
        while i < positions.len() && remaining.is_positive() {
            if positions[i].side == opposite {
                if positions[i].size.inner() <= remaining.inner() {
                    remaining = remaining.saturating_sub(positions[i].size);
                    positions.remove(i);
                    continue;
                }
                positions[i].size = positions[i].size.saturating_sub(remaining);
                remaining = Size::ZERO;
            }
            i += 1;
        }

        if remaining.is_positive() {
            if let Some(existing) = positions.iter_mut().find(|p| p.side == side) {
                let total = existing.size + remaining;
                let notional = existing.price.as_decimal() * existing.size.inner()
                    + price.as_decimal() * remaining.inner();
                existing.price = Price::from_decimal(notional / total.inner())?;
                existing.size = total;
            } else {
                positions.push(Position::new(side, remaining, price));
            }
        }

        debug!(
            %side,
            %price,
            %size,
            open = positions.len(),
            "Applied execution to position set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfmm_core::PriceLevel;
    use rust_decimal_macros::dec;

    fn two_sided_board() -> Board {
        Board::new(
            vec![PriceLevel::new(Price::new(10_004_000), Size::new(dec!(1)))],
            vec![PriceLevel::new(Price::new(10_000_000), Size::new(dec!(1)))],
        )
    }

    #[test]
    fn test_no_market_data_before_warmup() {
        let state = MarketState::new(1);
        assert!(!state.has_board());
        assert!(matches!(state.spread(), Err(FeedError::NoMarketData)));
        assert!(matches!(state.best_ask(), Err(FeedError::NoMarketData)));
    }

    #[test]
    fn test_spread_from_latest_board() {
        let state = MarketState::new(1);
        state.publish_board(two_sided_board());
        assert!(state.has_board());
        assert_eq!(state.spread().unwrap(), dec!(0.0004));
        assert_eq!(state.best_bid().unwrap(), Price::new(10_000_000));
    }

    #[test]
    fn test_remaining_size_sums_side() {
        let state = MarketState::new(1);
        state.set_positions(vec![Position::new(
            Side::Buy,
            Size::new(dec!(0.02)),
            Price::new(10_000_000),
        )]);

        assert_eq!(state.remaining_size(Side::Buy).unwrap(), Size::new(dec!(0.02)));
        assert_eq!(state.remaining_size(Side::Sell).unwrap(), Size::ZERO);
    }

    #[test]
    fn test_remaining_size_invariant_violation() {
        let state = MarketState::new(1);
        state.set_positions(vec![
            Position::new(Side::Buy, Size::new(dec!(0.01)), Price::new(10_000_000)),
            Position::new(Side::Buy, Size::new(dec!(0.01)), Price::new(10_001_000)),
        ]);

        assert!(matches!(
            state.remaining_size(Side::Buy),
            Err(FeedError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_execution_nets_opposite_side_first() {
        let state = MarketState::new(1);
        state.set_positions(vec![Position::new(
            Side::Sell,
            Size::new(dec!(0.02)),
            Price::new(10_004_000),
        )]);

        let event = OrderEvent::new("JRF-1".into(), OrderEventType::Execution).with_fill(
            Side::Buy,
            Price::new(10_000_000),
            Size::new(dec!(0.03)),
        );
        state.apply_order_events(vec![event]).unwrap();

        // 0.02 netted against the short, 0.01 opens a long.
        let positions = state.positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].side, Side::Buy);
        assert_eq!(positions[0].size, Size::new(dec!(0.01)));
        assert_eq!(positions[0].price, Price::new(10_000_000));
    }

    #[test]
    fn test_same_side_fills_merge_into_one_record() {
        let state = MarketState::new(1);

        for price in [10_000_000i64, 10_002_000] {
            let event = OrderEvent::new("JRF-1".into(), OrderEventType::Execution).with_fill(
                Side::Buy,
                Price::new(price),
                Size::new(dec!(0.01)),
            );
            state.apply_order_events(vec![event]).unwrap();
        }

        let positions = state.positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].size, Size::new(dec!(0.02)));
        assert_eq!(positions[0].price, Price::new(10_001_000));
        assert!(state.remaining_size(Side::Buy).is_ok());
    }

    #[test]
    fn test_events_are_broadcast() {
        let state = MarketState::new(1);
        let mut rx = state.subscribe_order_events();

        let event = OrderEvent::new("JRF-1".into(), OrderEventType::Order);
        state.apply_order_events(vec![event]).unwrap();

        let received = rx.try_recv().unwrap();
        assert_eq!(received.acceptance_id.as_str(), "JRF-1");
        assert_eq!(received.event_type, OrderEventType::Order);
    }
}
