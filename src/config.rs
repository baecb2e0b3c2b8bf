//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The optional price API key is referenced by env-var name in the config
//! and resolved at runtime via `std::env::var`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;

use crate::sources::pool::PoolApi;

/// Daily operating cost used when the cost log has nothing for the rig.
pub const DEFAULT_DAILY_COST_USD: f64 = 5.0;
pub const DEFAULT_POOL_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PRICE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DB_PATH: &str = "rigwatch.db";
pub const DEFAULT_DASHBOARD_PORT: u16 = 8501;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub rig: RigConfig,
    pub pool: PoolConfig,
    pub price: PriceConfig,
    #[serde(default)]
    pub cost: CostConfig,
    /// Absent means no secondary-currency conversion.
    #[serde(default)]
    pub profit: Option<ProfitConfig>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RigConfig {
    pub name: String,
    pub wallet: String,
    /// Coin ticker stored alongside cost entries, e.g. "kas".
    pub coin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PoolConfig {
    #[serde(default)]
    pub api: PoolApi,
    /// Endpoint URL with a `{wallet}` placeholder.
    pub url_template: String,
    #[serde(default = "default_pool_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PriceConfig {
    pub base_url: String,
    /// Price API identifier, e.g. "kaspa".
    pub coin_id: String,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_price_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CostConfig {
    #[serde(default = "default_daily_cost")]
    pub default_daily_usd: f64,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            default_daily_usd: DEFAULT_DAILY_COST_USD,
            db_path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

/// Fixed-rate conversion of profit into a second currency.
#[derive(Debug, Deserialize, Clone)]
pub struct ProfitConfig {
    pub secondary_currency: String,
    /// Units of the secondary currency per USD.
    pub usd_to_secondary: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { port: DEFAULT_DASHBOARD_PORT }
    }
}

fn default_pool_timeout() -> u64 {
    DEFAULT_POOL_TIMEOUT_SECS
}

fn default_price_timeout() -> u64 {
    DEFAULT_PRICE_TIMEOUT_SECS
}

fn default_daily_cost() -> f64 {
    DEFAULT_DAILY_COST_USD
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_port() -> u16 {
    DEFAULT_DASHBOARD_PORT
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pool.url_template.contains("{wallet}") {
            bail!("pool.url_template must contain a {{wallet}} placeholder");
        }
        if self.rig.wallet.trim().is_empty() {
            bail!("rig.wallet must not be empty");
        }
        let fallback = self.cost.default_daily_usd;
        if !fallback.is_finite() || fallback < 0.0 {
            bail!("cost.default_daily_usd must be a non-negative amount, got {fallback}");
        }
        if let Some(profit) = &self.profit {
            if !profit.usd_to_secondary.is_finite() || profit.usd_to_secondary <= 0.0 {
                bail!(
                    "profit.usd_to_secondary must be positive, got {}",
                    profit.usd_to_secondary
                );
            }
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
