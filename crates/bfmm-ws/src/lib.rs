//! WebSocket client for the bitFlyer Lightning Realtime API.
//!
//! Provides robust JSON-RPC 2.0 connectivity with:
//! - Automatic reconnection with exponential backoff
//! - Subscribe-on-connect with private-channel authentication
//! - Channel-based message routing over an mpsc channel

pub mod auth;
pub mod connection;
pub mod error;
pub mod message;

pub use auth::{auth_params, ApiCredentials, AuthParams};
pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};
pub use message::{ChannelMessage, JsonRpcIncoming, JsonRpcRequest, RpcError};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
