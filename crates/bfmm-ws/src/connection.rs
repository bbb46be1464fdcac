//! WebSocket connection manager.
//!
//! Handles connection lifecycle, automatic reconnection with exponential
//! backoff, and re-authentication/re-subscription after reconnect.

use crate::auth::{auth_params, ApiCredentials};
use crate::error::{WsError, WsResult};
use crate::message::{ChannelMessage, JsonRpcIncoming, JsonRpcRequest};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL.
    pub url: String,
    /// Channels to subscribe to on connect, in order.
    pub channels: Vec<String>,
    /// API credentials for private channels. If None, private channels
    /// cannot be subscribed and order events will not flow.
    pub credentials: Option<ApiCredentials>,
    /// Maximum reconnection attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff.
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for exponential backoff.
    pub reconnect_max_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            channels: Vec::new(),
            credentials: None,
            max_reconnect_attempts: 0, // Infinite
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 60000,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// WebSocket connection manager.
///
/// Forwards every `channelMessage` notification to `message_tx`; the feed
/// layer parses payloads. The manager itself only speaks the JSON-RPC
/// envelope.
pub struct ConnectionManager {
    config: ConnectionConfig,
    state: Arc<RwLock<ConnectionState>>,
    message_tx: mpsc::Sender<ChannelMessage>,
    reconnect_count: Arc<RwLock<u32>>,
    shutdown_token: CancellationToken,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new(config: ConnectionConfig, message_tx: mpsc::Sender<ChannelMessage>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            message_tx,
            reconnect_count: Arc::new(RwLock::new(0)),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Signal graceful shutdown.
    pub fn shutdown(&self) {
        info!("ConnectionManager shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect to the endpoint and run the message loop until shutdown.
    pub async fn connect(&self) -> WsResult<()> {
        self.connect_with_retry().await
    }

    async fn connect_with_retry(&self) -> WsResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.is_shutdown() {
                info!("Shutdown requested, exiting connect loop");
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            *self.state.write() = ConnectionState::Connecting;

            match self.try_connect().await {
                Ok(()) => {
                    info!("WebSocket connection closed");
                }
                Err(e) => {
                    error!(?e, "WebSocket connection error");
                }
            }

            if self.is_shutdown() {
                info!("Shutdown requested after disconnect, not reconnecting");
                *self.state.write() = ConnectionState::Disconnected;
                return Ok(());
            }

            attempt += 1;
            *self.reconnect_count.write() = attempt;

            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(attempt, "Max reconnection attempts reached");
                return Err(WsError::ConnectionFailed(
                    "Max reconnection attempts reached".to_string(),
                ));
            }

            *self.state.write() = ConnectionState::Reconnecting;

            let delay = self.calculate_backoff_delay(attempt);
            warn!(attempt, delay_ms = delay.as_millis(), "Reconnecting");

            // Wait for delay OR shutdown signal (cancellation-aware sleep)
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during backoff, exiting");
                    *self.state.write() = ConnectionState::Disconnected;
                    return Ok(());
                }
            }
        }
    }

    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay_ms = self
            .config
            .reconnect_base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.config.reconnect_max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    async fn try_connect(&self) -> WsResult<()> {
        info!(url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _) = connect_async(&self.config.url).await?;
        *self.state.write() = ConnectionState::Connected;
        info!("WebSocket connected");

        let (mut write, mut read) = ws_stream.split();
        let mut next_id = 1u64;

        // Auth must land before the private-channel subscribe below;
        // the server processes requests in order.
        if let Some(credentials) = &self.config.credentials {
            let params = serde_json::to_value(auth_params(credentials))?;
            let request = JsonRpcRequest::new("auth", params, next_id);
            next_id += 1;
            write
                .send(Message::Text(serde_json::to_string(&request)?))
                .await?;
            debug!("Auth request sent");
        }

        for channel in &self.config.channels {
            let request = JsonRpcRequest::subscribe(channel, next_id);
            next_id += 1;
            write
                .send(Message::Text(serde_json::to_string(&request)?))
                .await?;
        }
        info!(channels = ?self.config.channels, "Subscriptions sent");

        loop {
            tokio::select! {
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text(&text).await?;
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            write.send(Message::Pong(payload)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "Server closed connection");
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                    }
                }
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested, closing connection");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
            }
        }
    }

    async fn handle_text(&self, text: &str) -> WsResult<()> {
        let frame: JsonRpcIncoming = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(?e, "Unparseable frame, skipping");
                return Ok(());
            }
        };

        if let Some(err) = &frame.error {
            warn!(code = err.code, message = %err.message, id = ?frame.id, "RPC error frame");
            return Ok(());
        }

        if frame.method.is_none() {
            debug!(id = ?frame.id, result = ?frame.result, "RPC response");
            return Ok(());
        }

        if let Some(msg) = frame.into_channel_message() {
            self.message_tx
                .send(msg)
                .await
                .map_err(|_| WsError::SendFailed("message channel closed".to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(base_ms: u64, max_ms: u64) -> ConnectionManager {
        let (tx, _rx) = mpsc::channel(8);
        let config = ConnectionConfig {
            reconnect_base_delay_ms: base_ms,
            reconnect_max_delay_ms: max_ms,
            ..Default::default()
        };
        ConnectionManager::new(config, tx)
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let m = manager(1000, 8000);
        assert_eq!(m.calculate_backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(m.calculate_backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(m.calculate_backoff_delay(3), Duration::from_millis(4000));
        assert_eq!(m.calculate_backoff_delay(4), Duration::from_millis(8000));
        assert_eq!(m.calculate_backoff_delay(10), Duration::from_millis(8000));
    }

    #[tokio::test]
    async fn test_channel_message_forwarded() {
        let (tx, mut rx) = mpsc::channel(8);
        let m = ConnectionManager::new(ConnectionConfig::default(), tx);

        m.handle_text(
            r#"{"jsonrpc":"2.0","method":"channelMessage",
                "params":{"channel":"lightning_board_FX_BTC_JPY","message":{"asks":[],"bids":[]}}}"#,
        )
        .await
        .unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.channel, "lightning_board_FX_BTC_JPY");
    }

    #[tokio::test]
    async fn test_response_and_garbage_frames_skipped() {
        let (tx, mut rx) = mpsc::channel(8);
        let m = ConnectionManager::new(ConnectionConfig::default(), tx);

        m.handle_text(r#"{"jsonrpc":"2.0","id":1,"result":true}"#)
            .await
            .unwrap();
        m.handle_text("not json").await.unwrap();
        m.handle_text(r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32600,"message":"bad"}}"#)
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }
}
