//! Strategy configuration.

use crate::error::{MmError, MmResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Tuning knobs for the quoting strategy.
///
/// Interval defaults are budgeted against the exchange's private API
/// rate limit (500 requests per 5 minutes): one cancel plus re-entry
/// pair per side per poll interval stays well inside it.
#[derive(Debug, Clone, Deserialize)]
pub struct MakerConfig {
    /// Product code to quote.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Base order size per side.
    #[serde(default = "default_lot_size")]
    pub lot_size: Decimal,

    /// Cumulative book depth behind which quotes rest.
    #[serde(default = "default_threshold_size")]
    pub threshold_size: Decimal,

    /// Ticks added away from the touch at the derived price.
    #[serde(default = "default_margin")]
    pub margin: i64,

    /// Minimum relative spread before a cycle starts quoting.
    #[serde(default = "default_entry_spread")]
    pub entry_spread: Decimal,

    /// Relative spread above which a resting quote is repriced.
    #[serde(default = "default_update_spread")]
    pub update_spread: Decimal,

    /// Monitoring poll cadence per side.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay between spread-gate checks before entry.
    #[serde(default = "default_gate_retry_ms")]
    pub gate_retry_ms: u64,

    /// Pause between completed cycles.
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    /// Upper bound on waiting for a cancel outcome event.
    #[serde(default = "default_cancel_timeout_ms")]
    pub cancel_timeout_ms: u64,

    /// Maximum position records per side before the tracker errors.
    #[serde(default = "default_max_position")]
    pub max_position: usize,
}

fn default_symbol() -> String {
    "FX_BTC_JPY".to_string()
}

fn default_lot_size() -> Decimal {
    dec!(0.01)
}

fn default_threshold_size() -> Decimal {
    dec!(0.03)
}

fn default_margin() -> i64 {
    1
}

fn default_entry_spread() -> Decimal {
    dec!(0.0004)
}

fn default_update_spread() -> Decimal {
    dec!(0.0003)
}

fn default_poll_interval_ms() -> u64 {
    3500
}

fn default_gate_retry_ms() -> u64 {
    1000
}

fn default_cycle_interval_ms() -> u64 {
    5000
}

fn default_cancel_timeout_ms() -> u64 {
    30_000
}

fn default_max_position() -> usize {
    1
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            lot_size: default_lot_size(),
            threshold_size: default_threshold_size(),
            margin: default_margin(),
            entry_spread: default_entry_spread(),
            update_spread: default_update_spread(),
            poll_interval_ms: default_poll_interval_ms(),
            gate_retry_ms: default_gate_retry_ms(),
            cycle_interval_ms: default_cycle_interval_ms(),
            cancel_timeout_ms: default_cancel_timeout_ms(),
            max_position: default_max_position(),
        }
    }
}

impl MakerConfig {
    pub fn validate(&self) -> MmResult<()> {
        if self.symbol.is_empty() {
            return Err(MmError::InvalidConfig("symbol must not be empty".into()));
        }
        if self.lot_size <= Decimal::ZERO {
            return Err(MmError::InvalidConfig("lot_size must be positive".into()));
        }
        if self.threshold_size <= Decimal::ZERO {
            return Err(MmError::InvalidConfig(
                "threshold_size must be positive".into(),
            ));
        }
        if self.margin < 0 {
            return Err(MmError::InvalidConfig("margin must not be negative".into()));
        }
        if self.entry_spread <= self.update_spread {
            return Err(MmError::InvalidConfig(
                "entry_spread must exceed update_spread".into(),
            ));
        }
        if self.poll_interval_ms == 0 || self.gate_retry_ms == 0 {
            return Err(MmError::InvalidConfig(
                "poll_interval_ms and gate_retry_ms must be positive".into(),
            ));
        }
        if self.max_position == 0 {
            return Err(MmError::InvalidConfig(
                "max_position must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MakerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.symbol, "FX_BTC_JPY");
        assert_eq!(config.lot_size, dec!(0.01));
        assert_eq!(config.poll_interval_ms, 3500);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: MakerConfig = toml::from_str("symbol = \"BTC_JPY\"\nmargin = 2").unwrap();
        assert_eq!(config.symbol, "BTC_JPY");
        assert_eq!(config.margin, 2);
        assert_eq!(config.entry_spread, dec!(0.0004));
    }

    #[test]
    fn test_rejects_inverted_spreads() {
        let config = MakerConfig {
            entry_spread: dec!(0.0001),
            update_spread: dec!(0.0003),
            ..MakerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_lot() {
        let config = MakerConfig {
            lot_size: Decimal::ZERO,
            ..MakerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
