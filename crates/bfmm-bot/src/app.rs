//! Main application orchestration.
//!
//! Connects the realtime session, pumps channel messages into the shared
//! market state, waits for the first board snapshot, then runs quote
//! cycles until interrupted.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use bfmm_exchange::BitflyerClient;
use bfmm_feed::{FeedEvent, MarketState, MessageParser, OrderBook};
use bfmm_mm::Coordinator;
use bfmm_ws::{ApiCredentials, ChannelMessage, ConnectionConfig, ConnectionManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const MESSAGE_CHANNEL_CAPACITY: usize = 1000;

/// Delay between warm-up checks for the first board snapshot.
const WARMUP_RETRY: Duration = Duration::from_millis(500);

/// Main application.
pub struct Application {
    config: AppConfig,
    credentials: ApiCredentials,
    state: Arc<MarketState>,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.maker.validate()?;
        let credentials = ApiCredentials::from_env().ok_or(AppError::MissingCredentials)?;
        let state = Arc::new(MarketState::new(config.maker.max_position));
        Ok(Self {
            config,
            credentials,
            state,
        })
    }

    pub async fn run(self) -> AppResult<()> {
        let parser = MessageParser::new(&self.config.maker.symbol);

        let (message_tx, message_rx) = mpsc::channel::<ChannelMessage>(MESSAGE_CHANNEL_CAPACITY);
        let ws_config = ConnectionConfig {
            url: self.config.websocket.url.clone(),
            channels: parser.channels(),
            credentials: Some(self.credentials.clone()),
            max_reconnect_attempts: self.config.websocket.max_reconnect_attempts,
            reconnect_base_delay_ms: self.config.websocket.reconnect_base_delay_ms,
            reconnect_max_delay_ms: self.config.websocket.reconnect_max_delay_ms,
        };
        info!(
            url = %ws_config.url,
            channels = ?ws_config.channels,
            "Configured realtime session"
        );

        let connection = Arc::new(ConnectionManager::new(ws_config, message_tx));
        let ws_task = {
            let connection = Arc::clone(&connection);
            tokio::spawn(async move {
                if let Err(e) = connection.connect().await {
                    error!(error = %e, "Realtime session ended");
                }
            })
        };
        let _feed_task = tokio::spawn(pump_feed(parser, message_rx, Arc::clone(&self.state)));

        self.wait_for_market_data().await;

        let client = Arc::new(BitflyerClient::new(
            &self.config.rest_url,
            self.credentials.clone(),
        )?);
        let coordinator = Coordinator::new(client, Arc::clone(&self.state), self.config.maker.clone());

        info!("Entering quote cycle loop");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested");
                    connection.shutdown();
                    ws_task.await.ok();
                    return Ok(());
                }
                result = coordinator.run_cycle() => {
                    match result {
                        Ok(report) => {
                            info!(
                                edge = ?report.realized_edge,
                                buy = %report.buy_fill.acceptance_id,
                                sell = %report.sell_fill.acceptance_id,
                                "Cycle finished"
                            );
                        }
                        Err(e) => {
                            error!(error = %e, "Cycle aborted, starting a fresh one");
                        }
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(self.config.maker.cycle_interval_ms)).await;
        }
    }

    async fn wait_for_market_data(&self) {
        while !self.state.has_board() {
            info!("Waiting for the first board snapshot");
            tokio::time::sleep(WARMUP_RETRY).await;
        }
        info!("Market data live");
    }
}

/// Assemble the book and apply order events from the channel stream.
async fn pump_feed(
    parser: MessageParser,
    mut message_rx: mpsc::Receiver<ChannelMessage>,
    state: Arc<MarketState>,
) {
    let mut book = OrderBook::new();
    while let Some(msg) = message_rx.recv().await {
        match parser.parse(msg) {
            Ok(Some(FeedEvent::BoardSnapshot(raw))) => match book.apply_snapshot(&raw) {
                Ok(()) => state.publish_board(book.snapshot()),
                Err(e) => warn!(error = %e, "Bad board snapshot"),
            },
            Ok(Some(FeedEvent::BoardDiff(raw))) => {
                // Diffs arriving before the first snapshot have nothing to
                // apply against.
                if !book.is_seeded() {
                    continue;
                }
                match book.apply_diff(&raw) {
                    Ok(()) => state.publish_board(book.snapshot()),
                    Err(e) => warn!(error = %e, "Bad board diff"),
                }
            }
            Ok(Some(FeedEvent::OrderEvents(events))) => {
                if let Err(e) = state.apply_order_events(events) {
                    error!(error = %e, "Failed to apply order events");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to parse channel message"),
        }
    }
    warn!("Feed channel closed");
}
