//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (wallet key, funder address) are referenced by env-var name in
//! the config and resolved at runtime via `std::env::var`. Fractional
//! settings supplied as whole percentages (e.g. `15` for a 15% drawdown
//! limit) are normalized to fractions on load.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
    pub platform: PlatformConfig,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub name: String,
    pub scan_interval_secs: u64,
    pub initial_bankroll: f64,
    /// Emit a status summary every N cycles.
    #[serde(default = "default_status_every")]
    pub status_every_cycles: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    /// Minimum acceptable profit per dollar. `2` is read as 0.02.
    pub min_profit_rate: f64,
    /// Maximum position as a fraction of bankroll. `10` is read as 0.10.
    pub max_position_fraction: f64,
    /// Fixed per-trade cost estimate in dollars (gas plus fees).
    pub gas_cost: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RiskConfig {
    /// Drawdown fraction that halts the bot. `15` is read as 0.15.
    pub drawdown_limit: f64,
    pub max_trades_per_hour: usize,
    pub dry_run: bool,
    /// Length of the simulated-execution window after startup.
    pub dry_run_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformConfig {
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    #[serde(default = "default_market_limit")]
    pub market_limit: u32,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExecutionConfig {
    /// Polymarket CLOB signature type: 0 = EOA, 1 = email/magic proxy,
    /// 2 = browser wallet proxy. Types 1 and 2 require a funder address.
    pub signature_type: u8,
    pub private_key_env: Option<String>,
    pub funder_address_env: Option<String>,
}

fn default_status_every() -> u64 {
    10
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_market_limit() -> u32 {
    200
}

fn default_http_timeout() -> u64 {
    15
}

/// `15` means 15%; anything above 1.0 is a percentage.
fn normalize_fraction(v: f64) -> f64 {
    if v > 1.0 {
        v / 100.0
    } else {
        v
    }
}

impl AppConfig {
    /// Load configuration from a TOML file and normalize percentage-style
    /// fractions.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config.strategy.min_profit_rate = normalize_fraction(config.strategy.min_profit_rate);
        config.strategy.max_position_fraction =
            normalize_fraction(config.strategy.max_position_fraction);
        config.risk.drawdown_limit = normalize_fraction(config.risk.drawdown_limit);
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Whether live order submission is possible with this configuration.
    /// Proxy signature types without a resolvable funder address degrade
    /// the bot to analysis-only.
    pub fn can_submit_orders(&self) -> bool {
        match self.execution.signature_type {
            1 | 2 => self
                .execution
                .funder_address_env
                .as_deref()
                .map(|env| std::env::var(env).is_ok())
                .unwrap_or(false),
            _ => true,
        }
    }
}
