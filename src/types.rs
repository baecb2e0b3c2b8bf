//! Shared types for the RIGWATCH dashboard.
//!
//! These form the data model passed between the sources, the store,
//! the profit calculator and the controller. The [`Snapshot`] is the
//! view-model handed to the presentation layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Miner statistics
// ---------------------------------------------------------------------------

/// Pool statistics for one wallet, normalized across pool API variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MinerStats {
    /// Effective hashrate seen by the pool, in GH/s.
    pub hashrate_ghs: f64,
    /// Hashrate reported by the mining software, in GH/s.
    /// Only the `stats` API variant exposes this.
    pub reported_hashrate_ghs: Option<f64>,
    /// Estimated coin earned over the next 24 hours.
    pub estimated_daily_coin: f64,
    /// Coin earned but not yet paid out.
    pub unpaid_balance: f64,
    pub worker_count: u32,
}

impl fmt::Display for MinerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} GH/s | {} workers | {:.4} coin/day | unpaid {:.2}",
            self.hashrate_ghs, self.worker_count, self.estimated_daily_coin, self.unpaid_balance,
        )
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// Spot price of the mined coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Always > 0; the price client rejects anything else.
    pub usd_per_coin: f64,
}

// ---------------------------------------------------------------------------
// Cost log
// ---------------------------------------------------------------------------

/// One saved daily operating cost entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Store-assigned row id, increasing with insertion order.
    pub id: i64,
    pub date: NaiveDate,
    pub rig: String,
    pub coin: String,
    pub cost_usd: f64,
}

/// Where the cost used for a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostSource {
    /// Latest record in the cost log.
    Saved,
    /// No record (or the store failed); configured default used.
    Fallback,
    /// Unsaved value supplied by the presentation layer.
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostInput {
    pub usd: f64,
    pub source: CostSource,
}

// ---------------------------------------------------------------------------
// Profitability
// ---------------------------------------------------------------------------

/// Profit expressed in a second, fixed-rate currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryAmount {
    pub currency: String,
    pub amount: f64,
}

/// Daily income and profit. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitResult {
    pub income_usd: f64,
    pub profit_usd: f64,
    pub profit_secondary: Option<SecondaryAmount>,
}

impl ProfitResult {
    /// A break-even day counts as a loss.
    pub fn verdict(&self) -> Verdict {
        if self.profit_usd > 0.0 {
            Verdict::Profitable
        } else {
            Verdict::Loss
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Profitable,
    Loss,
}

impl Verdict {
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Profitable => "You're mining profitably!",
            Verdict::Loss => "Currently at a loss. Consider cost optimization.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Pool,
    Price,
    Store,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Pool => write!(f, "pool"),
            FailureKind::Price => write!(f, "price"),
            FailureKind::Store => write!(f, "store"),
        }
    }
}

/// A non-fatal failure surfaced to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

// ---------------------------------------------------------------------------
// View-model
// ---------------------------------------------------------------------------

/// One-shot view-model produced by each refresh or save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub wallet: String,
    pub rig: String,
    pub coin: String,
    pub stats: Option<MinerStats>,
    pub price: Option<PriceQuote>,
    pub cost: CostInput,
    /// Present only when both stats and price were fetched.
    pub profit: Option<ProfitResult>,
    pub verdict: Option<Verdict>,
    /// Set when profitability could not be computed.
    pub notice: Option<String>,
    pub timestamp_utc: DateTime<Utc>,
    pub failures: Vec<Failure>,
}

impl Snapshot {
    pub fn is_degraded(&self) -> bool {
        self.profit.is_none()
    }

    pub fn failure_kinds(&self) -> Vec<FailureKind> {
        self.failures.iter().map(|f| f.kind).collect()
    }
}
