//! Application configuration.

use crate::error::{AppError, AppResult};
use bfmm_mm::MakerConfig;
use serde::Deserialize;
use std::path::Path;

/// WebSocket session tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct WebsocketConfig {
    #[serde(default = "default_ws_url")]
    pub url: String,

    /// 0 means retry forever.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

fn default_ws_url() -> String {
    "wss://ws.lightstream.bitflyer.com/json-rpc".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    0
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60_000
}

impl Default for WebsocketConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_rest_url")]
    pub rest_url: String,

    #[serde(default)]
    pub websocket: WebsocketConfig,

    #[serde(default)]
    pub maker: MakerConfig,
}

fn default_rest_url() -> String {
    "https://api.bitflyer.com".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            websocket: WebsocketConfig::default(),
            maker: MakerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(%path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
