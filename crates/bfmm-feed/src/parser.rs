//! Channel payload parsing.
//!
//! Dispatches `channelMessage` payloads by channel name into typed feed
//! events: board snapshots, board diffs, and child-order events.

use crate::error::{FeedError, FeedResult};
use bfmm_core::{AcceptanceId, OrderEvent, OrderEventType, Price, Side, Size};
use bfmm_ws::ChannelMessage;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

/// Private stream of child-order lifecycle events.
const CHILD_ORDER_EVENTS_CHANNEL: &str = "child_order_events";

/// Raw board level as sent on the wire (decimal price).
#[derive(Debug, Clone, Deserialize)]
pub struct RawLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// Raw board payload, shared by the snapshot and diff channels.
///
/// On the diff channel a level with size 0 deletes that price.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBoard {
    #[serde(default)]
    pub mid_price: Option<Decimal>,
    #[serde(default)]
    pub asks: Vec<RawLevel>,
    #[serde(default)]
    pub bids: Vec<RawLevel>,
}

/// Raw child-order event as sent on the wire.
#[derive(Debug, Clone, Deserialize)]
struct RawOrderEvent {
    child_order_acceptance_id: String,
    event_type: OrderEventType,
    #[serde(default)]
    side: Option<Side>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    size: Option<Decimal>,
}

impl RawOrderEvent {
    fn into_event(self) -> FeedResult<OrderEvent> {
        let price = match self.price {
            Some(p) => Some(Price::from_decimal(p)?),
            None => None,
        };
        Ok(OrderEvent {
            acceptance_id: AcceptanceId::from_string(self.child_order_acceptance_id),
            event_type: self.event_type,
            side: self.side,
            price,
            size: self.size.map(Size::new),
            received_at: Utc::now(),
        })
    }
}

/// Parsed feed event.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Full board replacement.
    BoardSnapshot(RawBoard),
    /// Incremental board update.
    BoardDiff(RawBoard),
    /// Batch of child-order events.
    OrderEvents(Vec<OrderEvent>),
}

/// Channel message parser for one symbol.
pub struct MessageParser {
    board_snapshot_channel: String,
    board_diff_channel: String,
}

impl MessageParser {
    /// Create a parser for `symbol` (e.g. "FX_BTC_JPY").
    pub fn new(symbol: &str) -> Self {
        Self {
            board_snapshot_channel: format!("lightning_board_snapshot_{symbol}"),
            board_diff_channel: format!("lightning_board_{symbol}"),
        }
    }

    /// Channels this parser expects, in subscription order.
    ///
    /// The snapshot channel comes first so the book is seeded before
    /// diffs start arriving.
    pub fn channels(&self) -> Vec<String> {
        vec![
            self.board_snapshot_channel.clone(),
            self.board_diff_channel.clone(),
            CHILD_ORDER_EVENTS_CHANNEL.to_string(),
        ]
    }

    /// Parse one channel message. Unknown channels are skipped with a
    /// warning rather than failing the feed.
    pub fn parse(&self, msg: ChannelMessage) -> FeedResult<Option<FeedEvent>> {
        if msg.channel == self.board_snapshot_channel {
            let board: RawBoard = serde_json::from_value(msg.message)?;
            return Ok(Some(FeedEvent::BoardSnapshot(board)));
        }
        if msg.channel == self.board_diff_channel {
            let board: RawBoard = serde_json::from_value(msg.message)?;
            return Ok(Some(FeedEvent::BoardDiff(board)));
        }
        if msg.channel == CHILD_ORDER_EVENTS_CHANNEL {
            let raw: Vec<RawOrderEvent> = serde_json::from_value(msg.message)?;
            let events = raw
                .into_iter()
                .map(RawOrderEvent::into_event)
                .collect::<FeedResult<Vec<_>>>()?;
            return Ok(Some(FeedEvent::OrderEvents(events)));
        }

        warn!(channel = %msg.channel, "Unknown channel, skipping");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn channel_msg(channel: &str, message: serde_json::Value) -> ChannelMessage {
        let frame = serde_json::json!({ "channel": channel, "message": message });
        serde_json::from_value(frame).unwrap()
    }

    #[test]
    fn test_parse_board_snapshot() {
        let parser = MessageParser::new("FX_BTC_JPY");
        let msg = channel_msg(
            "lightning_board_snapshot_FX_BTC_JPY",
            serde_json::json!({
                "mid_price": 10000000,
                "asks": [{"price": 10000100, "size": 0.5}],
                "bids": [{"price": 9999900, "size": 0.3}]
            }),
        );

        match parser.parse(msg).unwrap() {
            Some(FeedEvent::BoardSnapshot(board)) => {
                assert_eq!(board.asks.len(), 1);
                assert_eq!(board.bids[0].size, dec!(0.3));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_order_events() {
        let parser = MessageParser::new("FX_BTC_JPY");
        let msg = channel_msg(
            "child_order_events",
            serde_json::json!([{
                "product_code": "FX_BTC_JPY",
                "child_order_acceptance_id": "JRF20240101-000000-000001",
                "event_type": "EXECUTION",
                "side": "BUY",
                "price": 10000000,
                "size": 0.01
            }]),
        );

        match parser.parse(msg).unwrap() {
            Some(FeedEvent::OrderEvents(events)) => {
                assert_eq!(events.len(), 1);
                assert_eq!(events[0].event_type, OrderEventType::Execution);
                assert_eq!(events[0].price, Some(Price::new(10_000_000)));
                assert_eq!(events[0].side, Some(Side::Buy));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_channel_skipped() {
        let parser = MessageParser::new("FX_BTC_JPY");
        let msg = channel_msg("lightning_ticker_BTC_JPY", serde_json::json!({}));
        assert!(parser.parse(msg).unwrap().is_none());
    }

    #[test]
    fn test_channels_order_snapshot_first() {
        let parser = MessageParser::new("FX_BTC_JPY");
        let channels = parser.channels();
        assert_eq!(channels[0], "lightning_board_snapshot_FX_BTC_JPY");
        assert_eq!(channels[1], "lightning_board_FX_BTC_JPY");
        assert_eq!(channels[2], "child_order_events");
    }
}
