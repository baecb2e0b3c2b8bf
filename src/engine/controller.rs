//! Dashboard controller: one refresh or save per call.
//!
//! fetch pool stats → fetch price → resolve daily cost → compute profit →
//! snapshot. Fetch and store failures never abort the pass; they are
//! recorded on the snapshot and whatever data is available is still shown.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::profit::{ProfitCalculator, SecondaryCurrency};
use crate::error::{MonitorError, Result};
use crate::sources::{PoolSource, PriceSource};
use crate::storage::CostStore;
use crate::types::{
    CostInput, CostRecord, CostSource, Failure, MinerStats, PriceQuote, Snapshot,
};

/// Shown when profitability cannot be computed this cycle.
pub const DEGRADED_NOTICE: &str =
    "Could not fetch pool or price data. Check network or API limits.";

/// Identity of the monitored rig and the cost fallback.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub wallet: String,
    pub rig: String,
    /// Coin ticker written to the cost log.
    pub coin: String,
    /// Identifier passed to the price source.
    pub price_coin_id: String,
    pub fallback_cost_usd: f64,
}

impl DashboardSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            wallet: cfg.rig.wallet.clone(),
            rig: cfg.rig.name.clone(),
            coin: cfg.rig.coin.clone(),
            price_coin_id: cfg.price.coin_id.clone(),
            fallback_cost_usd: cfg.cost.default_daily_usd,
        }
    }
}

/// Build the calculator's secondary currency from the `[profit]` section.
pub fn secondary_from_config(cfg: &AppConfig) -> Option<SecondaryCurrency> {
    cfg.profit.as_ref().map(|p| SecondaryCurrency {
        code: p.secondary_currency.clone(),
        usd_rate: p.usd_to_secondary,
    })
}

pub struct DashboardController {
    pool: Box<dyn PoolSource>,
    price: Box<dyn PriceSource>,
    store: CostStore,
    calculator: ProfitCalculator,
    settings: DashboardSettings,
}

impl DashboardController {
    pub fn new(
        pool: Box<dyn PoolSource>,
        price: Box<dyn PriceSource>,
        store: CostStore,
        calculator: ProfitCalculator,
        settings: DashboardSettings,
    ) -> Self {
        Self { pool, price, store, calculator, settings }
    }

    pub fn store(&self) -> &CostStore {
        &self.store
    }

    /// Run one refresh cycle.
    ///
    /// `cost_override` is an unsaved cost typed into the presentation
    /// layer; without it the rig's latest saved cost is used, then the
    /// configured fallback.
    pub async fn refresh(&self, cost_override: Option<f64>) -> Result<Snapshot> {
        if let Some(cost) = cost_override {
            validate_cost(cost)?;
        }

        let mut failures = Vec::new();
        let (stats, price) = self.fetch_sources(&mut failures).await;

        let cost = match cost_override {
            Some(usd) => CostInput { usd, source: CostSource::Override },
            None => self.resolve_cost(&mut failures).await,
        };

        Ok(self.assemble(stats, price, cost, failures))
    }

    /// Save today's cost for the rig, then recompute with it.
    pub async fn save_cost(&self, cost_usd: f64) -> Result<Snapshot> {
        self.save_cost_on(Utc::now().date_naive(), cost_usd).await
    }

    /// Save a cost entry for `date`, then recompute with it.
    ///
    /// A failed write is reported on the snapshot; the entered cost is
    /// still used for the recomputation.
    pub async fn save_cost_on(&self, date: NaiveDate, cost_usd: f64) -> Result<Snapshot> {
        validate_cost(cost_usd)?;

        let mut failures = Vec::new();
        let source = match self
            .store
            .insert(date, &self.settings.rig, &self.settings.coin, cost_usd)
            .await
        {
            Ok(record) => {
                info!(id = record.id, rig = %record.rig, cost_usd, "Daily cost saved");
                CostSource::Saved
            }
            Err(e) => {
                warn!(error = %e, "Failed to save daily cost");
                failures.push(e.to_failure());
                CostSource::Override
            }
        };

        let (stats, price) = self.fetch_sources(&mut failures).await;
        let cost = CostInput { usd: cost_usd, source };
        Ok(self.assemble(stats, price, cost, failures))
    }

    /// Saved cost entries for the rig, newest first.
    pub async fn history(&self, limit: u32) -> Result<Vec<CostRecord>> {
        self.store.history(&self.settings.rig, limit).await
    }

    // -- Internal helpers ------------------------------------------------

    async fn fetch_sources(
        &self,
        failures: &mut Vec<Failure>,
    ) -> (Option<MinerStats>, Option<PriceQuote>) {
        let stats = match self.pool.fetch(&self.settings.wallet).await {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "Pool fetch failed");
                failures.push(e.to_failure());
                None
            }
        };

        let price = match self.price.fetch(&self.settings.price_coin_id).await {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "Price fetch failed");
                failures.push(e.to_failure());
                None
            }
        };

        (stats, price)
    }

    async fn resolve_cost(&self, failures: &mut Vec<Failure>) -> CostInput {
        let fallback = CostInput {
            usd: self.settings.fallback_cost_usd,
            source: CostSource::Fallback,
        };

        match self.store.latest(&self.settings.rig).await {
            Ok(Some(record)) => CostInput { usd: record.cost_usd, source: CostSource::Saved },
            Ok(None) => fallback,
            Err(e) => {
                warn!(error = %e, "Failed to read latest cost, using fallback");
                failures.push(e.to_failure());
                fallback
            }
        }
    }

    fn assemble(
        &self,
        stats: Option<MinerStats>,
        price: Option<PriceQuote>,
        cost: CostInput,
        failures: Vec<Failure>,
    ) -> Snapshot {
        let profit = match (&stats, &price) {
            (Some(s), Some(p)) => {
                Some(self.calculator.compute(s.estimated_daily_coin, p.usd_per_coin, cost.usd))
            }
            _ => None,
        };
        let verdict = profit.as_ref().map(|p| p.verdict());
        let notice = profit.is_none().then(|| DEGRADED_NOTICE.to_string());

        info!(
            rig = %self.settings.rig,
            cost_usd = cost.usd,
            cost_source = ?cost.source,
            profit_usd = ?profit.as_ref().map(|p| p.profit_usd),
            failures = failures.len(),
            "Snapshot ready"
        );

        Snapshot {
            wallet: self.settings.wallet.clone(),
            rig: self.settings.rig.clone(),
            coin: self.settings.coin.clone(),
            stats,
            price,
            cost,
            profit,
            verdict,
            notice,
            timestamp_utc: Utc::now(),
            failures,
        }
    }
}

fn validate_cost(cost_usd: f64) -> Result<()> {
    if cost_usd.is_finite() && cost_usd >= 0.0 {
        Ok(())
    } else {
        Err(MonitorError::InvalidCost(cost_usd))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
