//! Single-side quote lifecycle.
//!
//! Runs one side of the quote from entry to fill: place a limit order at
//! the depth-derived price, monitor on a fixed poll cadence, reprice when
//! the spread widens, and resolve the cancel/fill race through the
//! exchange's CANCEL vs CANCEL_FAILED distinction. At most one resting
//! order exists per side at any instant; cancel confirmation always
//! precedes the replacement submission.

use crate::config::MakerConfig;
use crate::error::{MmError, MmResult};
use crate::pricer::depth_limit_price;
use bfmm_core::{OrderEvent, OrderEventType, Price, Side, Size, TimeInForce};
use bfmm_exchange::OrderApi;
use bfmm_feed::{EventMatch, EventWatcher, MarketState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// One side of the quote loop for one cycle.
pub struct QuoteLifecycle<A> {
    api: Arc<A>,
    state: Arc<MarketState>,
    config: MakerConfig,
    side: Side,
    size: Size,
}

impl<A: OrderApi> QuoteLifecycle<A> {
    pub fn new(
        api: Arc<A>,
        state: Arc<MarketState>,
        config: MakerConfig,
        side: Side,
        size: Size,
    ) -> Self {
        Self {
            api,
            state,
            config,
            side,
            size,
        }
    }

    /// Depth-derived quote price for this side from the latest board.
    fn quote_price(&self) -> MmResult<Price> {
        let board = self.state.board()?;
        let book_side = self.side.book_side();
        depth_limit_price(
            board.side(book_side),
            book_side,
            Size::new(self.config.threshold_size),
            self.config.margin,
        )
    }

    /// Run to fill. Returns the execution event that closed the quote.
    pub async fn run(self) -> MmResult<OrderEvent> {
        let mut price = self.quote_price()?;
        let mut acceptance_id = self
            .api
            .place_limit_order(
                &self.config.symbol,
                self.side,
                self.size,
                price,
                TimeInForce::GoodTilCancelled,
            )
            .await?;
        info!(
            side = %self.side,
            %price,
            size = %self.size,
            id = %acceptance_id,
            "Entered quote"
        );

        let execution_watcher = EventWatcher::spawn(
            self.state.subscribe_order_events(),
            EventMatch::execution(acceptance_id.clone()),
        );

        loop {
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;

            if execution_watcher.done() {
                let fill = execution_watcher.result()?;
                info!(
                    side = %self.side,
                    id = %fill.acceptance_id,
                    price = ?fill.price,
                    "Quote filled"
                );
                return Ok(fill);
            }

            let spread = self.state.spread()?;
            if spread <= self.config.update_spread {
                continue;
            }
            let candidate = self.quote_price()?;
            if candidate == price {
                continue;
            }

            // Arm the cancel watcher before issuing the request so the
            // outcome event cannot slip past it.
            let cancel_watcher = EventWatcher::spawn(
                self.state.subscribe_order_events(),
                EventMatch::cancel(acceptance_id.clone()),
            );
            if let Err(e) = self
                .api
                .cancel_order(&self.config.symbol, &acceptance_id)
                .await
            {
                warn!(side = %self.side, id = %acceptance_id, error = %e, "Cancel request failed to send");
            }

            let outcome = tokio::time::timeout(
                Duration::from_millis(self.config.cancel_timeout_ms),
                cancel_watcher.wait(),
            )
            .await
            .map_err(|_| {
                error!(side = %self.side, id = %acceptance_id, "No cancel outcome before timeout");
                MmError::CancelTimeout
            })??;

            if outcome.event_type == OrderEventType::Cancel {
                let replacement = match self
                    .api
                    .place_limit_order(
                        &self.config.symbol,
                        self.side,
                        self.size,
                        candidate,
                        TimeInForce::GoodTilCancelled,
                    )
                    .await
                {
                    Ok(id) => id,
                    Err(e) => {
                        error!(
                            side = %self.side,
                            price = %candidate,
                            cancelled = %acceptance_id,
                            "Replacement order rejected"
                        );
                        return Err(e.into());
                    }
                };
                execution_watcher.replace_target(replacement.clone());
                info!(
                    side = %self.side,
                    old = %acceptance_id,
                    new = %replacement,
                    %candidate,
                    "Repriced quote"
                );
                acceptance_id = replacement;
                price = candidate;
            } else {
                // CANCEL_FAILED: the order is filled or filling. The
                // execution watcher is still armed on the same id, keep
                // monitoring until it resolves.
                info!(side = %self.side, id = %acceptance_id, "Cancel refused, expecting fill");
            }
        }
    }
}
