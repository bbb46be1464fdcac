//! bitFlyer FX market-making bot.
//!
//! Wires the realtime feed into the shared market state, waits for the
//! first board snapshot, then runs quote cycles until shutdown.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
