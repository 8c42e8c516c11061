//! Configuration types for updown-edge
//!
//! Every section and field has a default, so a partial (or empty) TOML file
//! is valid.

use crate::engine::EngineConfig;
use crate::feed::BINANCE_WS_URL;
use crate::quote::{GammaConfig, GAMMA_API_URL};
use crate::scheduler::{CooldownPolicy, SchedulerConfig};
use crate::telemetry::LogFormat;
use crate::ws::ReconnectPolicy;
use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub market: MarketConfig,
    pub strategy: StrategyConfig,
    pub execution: ExecutionConfig,
    pub scheduler: SchedulerSection,
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Exchange symbol; derived from the asset when unset (btc -> btcusdt)
    pub symbol: Option<String>,
    /// WebSocket base URL
    pub ws_url: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay_secs: u64,
    /// Reconnect attempts before giving up for good
    pub max_reconnect_attempts: u32,
    /// How long prices are retained
    pub retention_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbol: None,
            ws_url: BINANCE_WS_URL.to_string(),
            reconnect_delay_secs: 5,
            max_reconnect_attempts: 10,
            retention_secs: 300,
        }
    }
}

/// Market and quote configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Asset symbol, e.g. "btc"
    pub asset: String,
    /// Round length in seconds
    pub round_duration_secs: u64,
    /// Gamma API base URL
    pub gamma_url: String,
    /// Quote cache lifetime
    pub quote_ttl_secs: u64,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            asset: "btc".to_string(),
            round_duration_secs: 900,
            gamma_url: GAMMA_API_URL.to_string(),
            quote_ttl_secs: 60,
            request_timeout_secs: 10,
        }
    }
}

/// Signal and sizing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Momentum lookback
    pub momentum_window_secs: u64,
    /// Momentum noise band, percent
    pub momentum_threshold_pct: Decimal,
    /// Minimum edge to propose, percentage points
    pub min_edge_pct: Decimal,
    /// Proposal size in USDC
    pub bet_size_usdc: Decimal,
    /// Added to the quoted probability for the limit price
    pub price_bump: Decimal,
    /// Ceiling on the limit price
    pub max_price: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            momentum_window_secs: 30,
            momentum_threshold_pct: dec!(0.15),
            min_edge_pct: dec!(5.0),
            bet_size_usdc: dec!(50),
            price_bump: dec!(0.01),
            max_price: dec!(0.99),
        }
    }
}

/// Execution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    /// Minimum spacing of accepted proposals
    pub cooldown_secs: u64,
    /// Whether failed executions restart the cooldown
    pub cooldown_policy: CooldownPolicy,
    /// Upper bound on one execution call
    pub timeout_secs: u64,
    /// Paper engine fee rate on notional
    pub fee_rate: Decimal,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Simulate,
            cooldown_secs: 60,
            cooldown_policy: CooldownPolicy::Always,
            timeout_secs: 10,
            fee_rate: Decimal::ZERO,
        }
    }
}

/// Execution mode: log-only simulation or paper fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Log proposals, never execute
    #[default]
    Simulate,
    /// Execute against the in-memory paper engine
    Paper,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Simulate => write!(f, "simulate"),
            ExecutionMode::Paper => write!(f, "paper"),
        }
    }
}

/// Loop timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub tick_interval_ms: u64,
    pub warmup_secs: u64,
    pub status_interval_secs: u64,
    pub error_backoff_secs: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            warmup_secs: 35,
            status_interval_secs: 5,
            error_backoff_secs: 5,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Prometheus exporter port; no exporter when unset
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.market.asset.trim().is_empty() {
            anyhow::bail!("market.asset must not be empty");
        }
        if self.market.round_duration_secs == 0 {
            anyhow::bail!("market.round_duration_secs must be positive");
        }
        if self.strategy.momentum_window_secs == 0 {
            anyhow::bail!("strategy.momentum_window_secs must be positive");
        }
        if self.strategy.momentum_window_secs >= self.feed.retention_secs {
            anyhow::bail!(
                "strategy.momentum_window_secs ({}) must be shorter than feed.retention_secs ({})",
                self.strategy.momentum_window_secs,
                self.feed.retention_secs
            );
        }
        if self.strategy.momentum_threshold_pct <= Decimal::ZERO {
            anyhow::bail!("strategy.momentum_threshold_pct must be positive");
        }
        if self.strategy.bet_size_usdc <= Decimal::ZERO {
            anyhow::bail!("strategy.bet_size_usdc must be positive");
        }
        if self.strategy.max_price <= Decimal::ZERO || self.strategy.max_price >= Decimal::ONE {
            anyhow::bail!("strategy.max_price must be within (0, 1)");
        }
        if self.scheduler.tick_interval_ms == 0 {
            anyhow::bail!("scheduler.tick_interval_ms must be positive");
        }
        Ok(())
    }

    /// Exchange symbol for the price feed
    pub fn feed_symbol(&self) -> String {
        self.feed
            .symbol
            .clone()
            .unwrap_or_else(|| format!("{}usdt", self.market.asset))
            .to_lowercase()
    }

    /// Feed reconnect policy
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            delay: Duration::from_secs(self.feed.reconnect_delay_secs),
            max_attempts: self.feed.max_reconnect_attempts,
        }
    }

    /// Gamma client settings
    pub fn gamma_config(&self) -> GammaConfig {
        GammaConfig {
            base_url: self.market.gamma_url.clone(),
            timeout: Duration::from_secs(self.market.request_timeout_secs),
            ..GammaConfig::default()
        }
    }

    /// Opportunity engine thresholds
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            min_edge_pct: self.strategy.min_edge_pct,
            price_bump: self.strategy.price_bump,
            max_price: self.strategy.max_price,
            size_usdc: self.strategy.bet_size_usdc,
        }
    }

    /// Scheduler settings
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.scheduler.tick_interval_ms),
            warmup: Duration::from_secs(self.scheduler.warmup_secs),
            status_interval: chrono::Duration::seconds(self.scheduler.status_interval_secs as i64),
            error_backoff: Duration::from_secs(self.scheduler.error_backoff_secs),
            cooldown: chrono::Duration::seconds(self.execution.cooldown_secs as i64),
            cooldown_policy: self.execution.cooldown_policy,
            momentum_window_secs: self.strategy.momentum_window_secs,
            momentum_threshold_pct: self.strategy.momentum_threshold_pct,
            mode: self.execution.mode,
            execution_timeout: Duration::from_secs(self.execution.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            [feed]
            symbol = "BTCUSDT"
            reconnect_delay_secs = 3

            [market]
            asset = "btc"
            round_duration_secs = 900

            [strategy]
            momentum_window_secs = 30
            momentum_threshold_pct = 0.15
            min_edge_pct = 5.0
            bet_size_usdc = 50

            [execution]
            mode = "paper"
            cooldown_secs = 60
            cooldown_policy = "on_success"

            [telemetry]
            log_level = "debug"
            log_format = "json"
            metrics_port = 9090
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.feed_symbol(), "btcusdt");
        assert_eq!(config.feed.reconnect_delay_secs, 3);
        assert_eq!(config.feed.max_reconnect_attempts, 10);
        assert_eq!(config.strategy.min_edge_pct, dec!(5.0));
        assert_eq!(config.execution.mode, ExecutionMode::Paper);
        assert_eq!(config.execution.cooldown_policy, CooldownPolicy::OnSuccess);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.metrics_port, Some(9090));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.market.asset, "btc");
        assert_eq!(config.execution.mode, ExecutionMode::Simulate);
        assert_eq!(config.execution.cooldown_policy, CooldownPolicy::Always);
        assert!(config.telemetry.metrics_port.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_feed_symbol_derived_from_asset() {
        let mut config = Config::default();
        config.market.asset = "ETH".to_string();
        assert_eq!(config.feed_symbol(), "ethusdt");
    }

    #[test]
    fn test_derived_settings() {
        let config = Config::default();

        let policy = config.reconnect_policy();
        assert_eq!(policy.delay, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 10);

        let engine = config.engine_config();
        assert_eq!(engine.min_edge_pct, dec!(5.0));
        assert_eq!(engine.size_usdc, dec!(50));

        let scheduler = config.scheduler_config();
        assert_eq!(scheduler.tick_interval, Duration::from_secs(1));
        assert_eq!(scheduler.warmup, Duration::from_secs(35));
        assert_eq!(scheduler.cooldown, chrono::Duration::seconds(60));
        assert_eq!(scheduler.momentum_threshold_pct, dec!(0.15));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.market.round_duration_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.strategy.momentum_threshold_pct = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.strategy.momentum_window_secs = 300;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.strategy.max_price = dec!(1.2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[market]\nasset = \"sol\"\n\n[execution]\nmode = \"simulate\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.market.asset, "sol");
        assert_eq!(config.feed_symbol(), "solusdt");
    }

    #[test]
    fn test_config_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[strategy]\nbet_size_usdc = -1").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(include_str!("../config.toml.example")).unwrap();
        assert!(config.validate().is_ok());
    }
}
