//! Fake pool and price sources for integration testing.
//!
//! Deterministic, in-memory implementations of the source traits. Clones
//! share state, so a test can keep a handle to flip a source into an error
//! state after handing it to the controller.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rigwatch::error::{MonitorError, Result};
use rigwatch::sources::{PoolSource, PriceSource};
use rigwatch::types::{MinerStats, PriceQuote};

/// Stats matching the reference payload
/// `{hashrate: 5e9, estimatedRewards24h: 12.5, balance: 3.2, workers: {a, b}}`.
pub fn reference_stats() -> MinerStats {
    MinerStats {
        hashrate_ghs: 5.0,
        reported_hashrate_ghs: None,
        estimated_daily_coin: 12.5,
        unpaid_balance: 3.2,
        worker_count: 2,
    }
}

#[derive(Clone)]
pub struct FakePool {
    stats: MinerStats,
    /// If set, fetches fail with `PoolUnavailable(status)`.
    fail_status: Arc<Mutex<Option<u16>>>,
    calls: Arc<AtomicUsize>,
    wallets: Arc<Mutex<Vec<String>>>,
}

impl FakePool {
    pub fn new(stats: MinerStats) -> Self {
        Self {
            stats,
            fail_status: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            wallets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_failing(&self, status: Option<u16>) {
        *self.fail_status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn wallets(&self) -> Vec<String> {
        self.wallets.lock().unwrap().clone()
    }
}

#[async_trait]
impl PoolSource for FakePool {
    async fn fetch(&self, wallet: &str) -> Result<MinerStats> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.wallets.lock().unwrap().push(wallet.to_string());
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(MonitorError::PoolUnavailable(status)),
            None => Ok(self.stats.clone()),
        }
    }
}

#[derive(Clone)]
pub struct FakePrice {
    usd: Arc<Mutex<Option<f64>>>,
    calls: Arc<AtomicUsize>,
}

impl FakePrice {
    pub fn new(usd: f64) -> Self {
        Self {
            usd: Arc::new(Mutex::new(Some(usd))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// `None` makes every fetch fail with `PriceUnavailable`.
    pub fn set_price(&self, usd: Option<f64>) {
        *self.usd.lock().unwrap() = usd;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FakePrice {
    async fn fetch(&self, coin_id: &str) -> Result<PriceQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.usd.lock().unwrap() {
            Some(usd) => Ok(PriceQuote { usd_per_coin: usd }),
            None => Err(MonitorError::PriceUnavailable(format!("no quote for {coin_id}"))),
        }
    }
}
