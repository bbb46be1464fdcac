//! bitFlyer FX market-making bot entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// bitFlyer FX two-sided market-making bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BFMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // TLS crypto provider must be installed before any connections.
    bfmm_ws::init_crypto();

    let args = Args::parse();

    bfmm_bot::logging::init_logging()?;
    info!("Starting bfmm v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("BFMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());
    info!(config_path = %config_path, "Loading configuration");

    let config = bfmm_bot::AppConfig::load(&config_path)?;
    info!(symbol = %config.maker.symbol, rest_url = %config.rest_url, "Configuration loaded");

    let app = bfmm_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
