//! Child-order event notifications.
//!
//! The exchange reports order lifecycle transitions (acceptance, cancel,
//! cancel failure, execution, expiry) on a private stream, correlated to an
//! order by its acceptance id.

use crate::decimal::{Price, Size};
use crate::order::{AcceptanceId, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event discriminator from the child-order event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    /// Order accepted and resting.
    Order,
    /// Order rejected after acceptance (margin, price bands, ...).
    OrderFailed,
    /// Cancel confirmed; the order is gone.
    Cancel,
    /// Cancel refused: the order no longer exists, typically because it
    /// filled (or is filling) before the cancel landed.
    CancelFailed,
    /// Execution against the resting order.
    Execution,
    /// Order expired (time-in-force).
    Expire,
}

impl fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order => write!(f, "ORDER"),
            Self::OrderFailed => write!(f, "ORDER_FAILED"),
            Self::Cancel => write!(f, "CANCEL"),
            Self::CancelFailed => write!(f, "CANCEL_FAILED"),
            Self::Execution => write!(f, "EXECUTION"),
            Self::Expire => write!(f, "EXPIRE"),
        }
    }
}

/// One notification from the child-order event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Acceptance id of the order this event refers to.
    pub acceptance_id: AcceptanceId,
    pub event_type: OrderEventType,
    /// Side of the order; absent on some administrative events.
    pub side: Option<Side>,
    /// Price carried by the event (execution price for EXECUTION).
    pub price: Option<Price>,
    /// Size carried by the event (executed size for EXECUTION).
    pub size: Option<Size>,
    /// Timestamp when the event was received locally.
    pub received_at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn new(acceptance_id: AcceptanceId, event_type: OrderEventType) -> Self {
        Self {
            acceptance_id,
            event_type,
            side: None,
            price: None,
            size: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_fill(mut self, side: Side, price: Price, size: Size) -> Self {
        self.side = Some(side);
        self.price = Some(price);
        self.size = Some(size);
        self
    }

    /// Whether this event terminates the order's life on the book.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.event_type,
            OrderEventType::Cancel | OrderEventType::Execution | OrderEventType::Expire
        )
    }
}
