//! Order-related types and identifiers.
//!
//! Provides order side, time-in-force, and the acceptance id returned by
//! the exchange on order submission.

use crate::book::BookSide;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of exchange acceptance ids (vs. exchange-assigned order ids).
const ACCEPTANCE_ID_PREFIX: &str = "JRF";

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for position calculations).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }

    /// The book side this order side quotes against: buys rest on the bid
    /// side, sells on the ask side.
    pub fn book_side(&self) -> BookSide {
        match self {
            Self::Buy => BookSide::Bid,
            Self::Sell => BookSide::Ask,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled (our primary TIF for resting quotes).
    #[default]
    #[serde(rename = "GTC")]
    GoodTilCancelled,
    /// Immediate-or-cancel.
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Fill-or-kill.
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoodTilCancelled => write!(f, "GTC"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
            Self::FillOrKill => write!(f, "FOK"),
        }
    }
}

/// Order id returned by the exchange when an order is accepted.
///
/// The acceptance id is the identity of one live order instance: every
/// cancel+re-enter produces a new one, and later notifications are
/// correlated to the order through it. The exchange also assigns a separate
/// order id once the order rests; cancel requests accept either, selecting
/// the request field by the `JRF` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AcceptanceId(String);

impl AcceptanceId {
    /// Create from a string returned by the exchange.
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is an acceptance id (`JRF...`) rather than an
    /// exchange-assigned order id.
    pub fn is_acceptance(&self) -> bool {
        self.0.starts_with(ACCEPTANCE_ID_PREFIX)
    }
}

impl fmt::Display for AcceptanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AcceptanceId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl From<&str> for AcceptanceId {
    fn from(s: &str) -> Self {
        Self::from_string(s.to_string())
    }
}

impl AsRef<str> for AcceptanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_book_side() {
        assert_eq!(Side::Buy.book_side(), BookSide::Bid);
        assert_eq!(Side::Sell.book_side(), BookSide::Ask);
    }

    #[test]
    fn test_side_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        let s: Side = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(s, Side::Sell);
    }

    #[test]
    fn test_acceptance_id_prefix() {
        assert!(AcceptanceId::from("JRF20240101-000000-000001").is_acceptance());
        assert!(!AcceptanceId::from("JOR20240101-000000-000001").is_acceptance());
    }

    #[test]
    fn test_tif_display() {
        assert_eq!(TimeInForce::GoodTilCancelled.to_string(), "GTC");
        assert_eq!(TimeInForce::ImmediateOrCancel.to_string(), "IOC");
    }
}
