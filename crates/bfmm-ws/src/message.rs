//! JSON-RPC 2.0 message types for the Lightning Realtime API.
//!
//! The feed speaks plain JSON-RPC: `subscribe`/`auth` requests go out with
//! numeric ids, and market data arrives as `channelMessage` notifications
//! whose params carry the channel name and the channel-specific payload.

use serde::{Deserialize, Serialize};

/// Outgoing JSON-RPC request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Build a `subscribe` request for one channel.
    pub fn subscribe(channel: &str, id: u64) -> Self {
        Self::new("subscribe", serde_json::json!({ "channel": channel }), id)
    }
}

/// Params of an incoming `channelMessage` notification.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelMessage {
    pub channel: String,
    pub message: serde_json::Value,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Incoming JSON-RPC frame: either a notification (`method` + `params`)
/// or a response to one of our requests (`id` + `result`/`error`).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcIncoming {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl JsonRpcIncoming {
    /// Extract the channel message if this frame is a `channelMessage`
    /// notification.
    pub fn into_channel_message(self) -> Option<ChannelMessage> {
        if self.method.as_deref() != Some("channelMessage") {
            return None;
        }
        self.params
            .and_then(|p| serde_json::from_value::<ChannelMessage>(p).ok())
    }
}
