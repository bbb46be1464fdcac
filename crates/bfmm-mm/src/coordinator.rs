//! Cycle coordination.
//!
//! Gates entry on the relative spread, sizes both sides so the larger
//! side flattens held inventory, runs the two quote lifecycles
//! concurrently, and reports the realized edge once both have filled.

use crate::config::MakerConfig;
use crate::error::MmResult;
use crate::lifecycle::QuoteLifecycle;
use bfmm_core::{OrderEvent, Side, Size};
use bfmm_exchange::OrderApi;
use bfmm_feed::{FeedError, MarketState};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Outcome of one completed cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub buy_fill: OrderEvent,
    pub sell_fill: OrderEvent,
    /// Sell fill price minus buy fill price, when both are known.
    pub realized_edge: Option<i64>,
}

/// Runs market-making cycles over a shared market state.
pub struct Coordinator<A> {
    api: Arc<A>,
    state: Arc<MarketState>,
    config: MakerConfig,
}

impl<A: OrderApi> Coordinator<A> {
    pub fn new(api: Arc<A>, state: Arc<MarketState>, config: MakerConfig) -> Self {
        Self { api, state, config }
    }

    /// Run one cycle to completion: wait for the spread, quote both
    /// sides, join both fills.
    pub async fn run_cycle(&self) -> MmResult<CycleReport> {
        self.wait_for_entry_spread().await?;

        let lot = Size::new(self.config.lot_size);
        let buy_size = lot + self.state.remaining_size(Side::Sell)?;
        let sell_size = lot + self.state.remaining_size(Side::Buy)?;
        info!(
            buy_size = %buy_size,
            sell_size = %sell_size,
            "Starting quote cycle"
        );

        let buy = QuoteLifecycle::new(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            self.config.clone(),
            Side::Buy,
            buy_size,
        );
        let sell = QuoteLifecycle::new(
            Arc::clone(&self.api),
            Arc::clone(&self.state),
            self.config.clone(),
            Side::Sell,
            sell_size,
        );

        // Both sides settle before any error propagates; aborting one
        // side mid-flight could leave a live resting order behind.
        let (buy_result, sell_result) = tokio::join!(buy.run(), sell.run());
        let buy_fill = buy_result?;
        let sell_fill = sell_result?;

        let realized_edge = match (sell_fill.price, buy_fill.price) {
            (Some(sell), Some(buy)) => Some(sell.inner() - buy.inner()),
            _ => None,
        };
        info!(edge = ?realized_edge, "Cycle complete");

        Ok(CycleReport {
            buy_fill,
            sell_fill,
            realized_edge,
        })
    }

    async fn wait_for_entry_spread(&self) -> MmResult<()> {
        loop {
            match self.state.spread() {
                Ok(spread) if spread > self.config.entry_spread => return Ok(()),
                Ok(spread) => {
                    info!(%spread, entry = %self.config.entry_spread, "Waiting for chance");
                }
                Err(FeedError::NoMarketData) => {
                    info!("Waiting for market data");
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(Duration::from_millis(self.config.gate_retry_ms)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfmm_core::{AcceptanceId, Board, OrderEventType, Position, Price, PriceLevel, TimeInForce};
    use bfmm_exchange::ExchangeResult;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    struct MockApi {
        placed: Mutex<Vec<(Side, Price, Size)>>,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                placed: Mutex::new(Vec::new()),
            }
        }
    }

    impl OrderApi for MockApi {
        async fn place_limit_order(
            &self,
            _symbol: &str,
            side: Side,
            size: Size,
            price: Price,
            _time_in_force: TimeInForce,
        ) -> ExchangeResult<AcceptanceId> {
            self.placed.lock().push((side, price, size));
            Ok(match side {
                Side::Buy => "JRF-B",
                Side::Sell => "JRF-S",
            }
            .into())
        }

        async fn cancel_order(
            &self,
            _symbol: &str,
            _acceptance_id: &AcceptanceId,
        ) -> ExchangeResult<bool> {
            Ok(true)
        }
    }

    fn board(ask: i64, bid: i64) -> Board {
        Board::new(
            vec![
                PriceLevel::new(Price::new(ask), Size::new(dec!(0.05))),
                PriceLevel::new(Price::new(ask + 100), Size::new(dec!(1))),
            ],
            vec![
                PriceLevel::new(Price::new(bid), Size::new(dec!(0.05))),
                PriceLevel::new(Price::new(bid - 100), Size::new(dec!(1))),
            ],
        )
    }

    fn fill(id: &str, side: Side, price: i64, size: Size) -> OrderEvent {
        OrderEvent::new(id.into(), OrderEventType::Execution).with_fill(
            side,
            Price::new(price),
            size,
        )
    }

    fn coordinator(
        api: Arc<MockApi>,
        state: Arc<MarketState>,
    ) -> Arc<Coordinator<MockApi>> {
        let config = MakerConfig {
            poll_interval_ms: 100,
            gate_retry_ms: 100,
            ..MakerConfig::default()
        };
        Arc::new(Coordinator::new(api, state, config))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_spread_gate_blocks_until_wide() {
        let state = Arc::new(MarketState::new(1));
        state.publish_board(board(10_001_000, 10_000_000));
        let api = Arc::new(MockApi::new());
        let coord = coordinator(Arc::clone(&api), Arc::clone(&state));

        let handle = tokio::spawn({
            let coord = Arc::clone(&coord);
            async move { coord.run_cycle().await }
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(api.placed.lock().is_empty());

        state.publish_board(board(10_030_000, 10_010_000));
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(api.placed.lock().len(), 2);

        state
            .apply_order_events(vec![
                fill("JRF-B", Side::Buy, 10_009_999, Size::new(dec!(0.01))),
                fill("JRF-S", Side::Sell, 10_030_001, Size::new(dec!(0.01))),
            ])
            .unwrap();

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.realized_edge, Some(20_002));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sizing_flattens_inventory() {
        let state = Arc::new(MarketState::new(1));
        state.publish_board(board(10_030_000, 10_010_000));
        // A held short grows the buy side.
        state.set_positions(vec![Position::new(
            Side::Sell,
            Size::new(dec!(0.02)),
            Price::new(10_020_000),
        )]);
        let api = Arc::new(MockApi::new());
        let coord = coordinator(Arc::clone(&api), Arc::clone(&state));

        let handle = tokio::spawn({
            let coord = Arc::clone(&coord);
            async move { coord.run_cycle().await }
        });
        settle().await;

        {
            let placed = api.placed.lock();
            assert_eq!(placed.len(), 2);
            let buy = placed.iter().find(|(s, _, _)| *s == Side::Buy).unwrap();
            let sell = placed.iter().find(|(s, _, _)| *s == Side::Sell).unwrap();
            assert_eq!(buy.2, Size::new(dec!(0.03)));
            assert_eq!(sell.2, Size::new(dec!(0.01)));
        }

        state
            .apply_order_events(vec![
                fill("JRF-B", Side::Buy, 10_009_999, Size::new(dec!(0.03))),
                fill("JRF-S", Side::Sell, 10_030_001, Size::new(dec!(0.01))),
            ])
            .unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_positions_abort_cycle() {
        let state = Arc::new(MarketState::new(1));
        state.publish_board(board(10_030_000, 10_010_000));
        state.set_positions(vec![
            Position::new(Side::Sell, Size::new(dec!(0.01)), Price::new(10_020_000)),
            Position::new(Side::Sell, Size::new(dec!(0.01)), Price::new(10_021_000)),
        ]);
        let api = Arc::new(MockApi::new());
        let coord = coordinator(Arc::clone(&api), Arc::clone(&state));

        let result = coord.run_cycle().await;
        assert!(matches!(
            result,
            Err(crate::error::MmError::Feed(FeedError::InvariantViolation(_)))
        ));
        assert!(api.placed.lock().is_empty());
    }
}
