//! Order entry seam.

use crate::error::ExchangeResult;
use bfmm_core::{AcceptanceId, Price, Side, Size, TimeInForce};

/// Order placement and cancellation against one venue.
///
/// The quote lifecycle is generic over this trait; tests substitute
/// scripted implementations.
#[allow(async_fn_in_trait)]
pub trait OrderApi {
    /// Place a limit order. Returns the acceptance id identifying the
    /// order in subsequent child-order events.
    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        size: Size,
        price: Price,
        time_in_force: TimeInForce,
    ) -> ExchangeResult<AcceptanceId>;

    /// Request cancellation. Returns whether the exchange accepted the
    /// request; the actual outcome arrives as a child-order event.
    async fn cancel_order(
        &self,
        symbol: &str,
        acceptance_id: &AcceptanceId,
    ) -> ExchangeResult<bool>;
}
