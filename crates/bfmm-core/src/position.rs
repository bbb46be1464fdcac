//! Held position records.

use crate::decimal::{Price, Size};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// One held position as reported by the exchange.
///
/// A symbol holds at most a configured number of records per side
/// (typically one); exceeding it signals corruption upstream and is
/// asserted at read time by the position tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub size: Size,
    /// Average entry price.
    pub price: Price,
}

impl Position {
    pub fn new(side: Side, size: Size, price: Price) -> Self {
        Self { side, size, price }
    }
}
