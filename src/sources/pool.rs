//! Mining-pool statistics client.
//!
//! Two pool API shapes are supported and normalized onto [`MinerStats`]:
//!
//! - `stats` (WoolyPooly-style): flat `hashrate`, `reportedHashrate`,
//!   `estimatedRewards24h`, `balance` and a `workers` mapping.
//! - `account`: `currentHashrate`, `estimatedRewards24h`, balance nested
//!   under `stats`, and a `workers` list. No reported hashrate.
//!
//! Missing or `null` fields default to zero, missing worker collections to
//! empty. Raw hashrates are in H/s.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::PoolSource;
use crate::error::{MonitorError, Result};
use crate::types::MinerStats;

/// H/s → GH/s divisor.
pub const HASHES_PER_GIGAHASH: f64 = 1e9;

/// Which pool API payload shape to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolApi {
    #[default]
    Stats,
    Account,
}

// ---------------------------------------------------------------------------
// API response types (pool JSON → Rust)
// ---------------------------------------------------------------------------

/// Pools report workers either keyed by name or as a plain list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkerSet {
    Map(serde_json::Map<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
}

/// Missing, `null` or negative values become zero.
fn non_negative(v: Option<f64>) -> f64 {
    v.unwrap_or(0.0).max(0.0)
}

fn worker_count(workers: Option<WorkerSet>) -> u32 {
    let n = match workers {
        Some(WorkerSet::Map(m)) => m.len(),
        Some(WorkerSet::List(l)) => l.len(),
        None => 0,
    };
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// `stats` variant payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsPayload {
    #[serde(default)]
    hashrate: Option<f64>,
    #[serde(default)]
    reported_hashrate: Option<f64>,
    #[serde(default, rename = "estimatedRewards24h")]
    estimated_rewards_24h: Option<f64>,
    #[serde(default)]
    balance: Option<f64>,
    #[serde(default)]
    workers: Option<WorkerSet>,
}

impl StatsPayload {
    fn normalize(self) -> MinerStats {
        MinerStats {
            hashrate_ghs: non_negative(self.hashrate) / HASHES_PER_GIGAHASH,
            reported_hashrate_ghs: self
                .reported_hashrate
                .map(|h| h.max(0.0) / HASHES_PER_GIGAHASH),
            estimated_daily_coin: non_negative(self.estimated_rewards_24h),
            unpaid_balance: non_negative(self.balance),
            worker_count: worker_count(self.workers),
        }
    }
}

/// `account` variant payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountPayload {
    #[serde(default)]
    current_hashrate: Option<f64>,
    #[serde(default, rename = "estimatedRewards24h")]
    estimated_rewards_24h: Option<f64>,
    #[serde(default)]
    stats: Option<AccountBalance>,
    #[serde(default)]
    workers: Option<WorkerSet>,
}

#[derive(Debug, Deserialize)]
struct AccountBalance {
    #[serde(default)]
    balance: Option<f64>,
}

impl AccountPayload {
    fn normalize(self) -> MinerStats {
        MinerStats {
            hashrate_ghs: non_negative(self.current_hashrate) / HASHES_PER_GIGAHASH,
            reported_hashrate_ghs: None,
            estimated_daily_coin: non_negative(self.estimated_rewards_24h),
            unpaid_balance: non_negative(self.stats.and_then(|s| s.balance)),
            worker_count: worker_count(self.workers),
        }
    }
}

/// Parse a raw pool response body into normalized stats.
pub fn normalize(api: PoolApi, body: &[u8]) -> Result<MinerStats> {
    let parse_err = |e: serde_json::Error| MonitorError::ParseFailure {
        origin: "pool",
        detail: e.to_string(),
    };

    let stats = match api {
        PoolApi::Stats => serde_json::from_slice::<StatsPayload>(body)
            .map_err(parse_err)?
            .normalize(),
        PoolApi::Account => serde_json::from_slice::<AccountPayload>(body)
            .map_err(parse_err)?
            .normalize(),
    };
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Pool statistics client. One GET per fetch, no retries.
pub struct PoolStatsClient {
    http: Client,
    api: PoolApi,
    /// Endpoint URL containing a `{wallet}` placeholder.
    url_template: String,
}

impl PoolStatsClient {
    pub fn new(api: PoolApi, url_template: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("RIGWATCH/0.1.0")
            .build()
            .context("Failed to build HTTP client for pool API")?;

        Ok(Self { http, api, url_template: url_template.into() })
    }

    pub fn api(&self) -> PoolApi {
        self.api
    }

    fn endpoint(&self, wallet: &str) -> String {
        self.url_template.replace("{wallet}", &urlencoding::encode(wallet))
    }
}

#[async_trait]
impl PoolSource for PoolStatsClient {
    async fn fetch(&self, wallet: &str) -> Result<MinerStats> {
        let url = self.endpoint(wallet);
        debug!(url = %url, api = ?self.api, "Fetching pool stats");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MonitorError::PoolUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Pool API returned an error status");
            return Err(MonitorError::PoolUnavailable(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| MonitorError::PoolUnreachable(e.to_string()))?;

        let stats = normalize(self.api, &body)?;
        info!(
            hashrate_ghs = stats.hashrate_ghs,
            workers = stats.worker_count,
            daily_coin = stats.estimated_daily_coin,
            "Pool stats fetched"
        );
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
