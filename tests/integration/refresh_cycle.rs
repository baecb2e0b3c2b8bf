//! Refresh/save cycles through the controller with fake sources and a
//! file-backed cost store.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use rigwatch::engine::controller::{DashboardController, DashboardSettings, DEGRADED_NOTICE};
use rigwatch::engine::profit::ProfitCalculator;
use rigwatch::storage::CostStore;
use rigwatch::types::{CostSource, FailureKind, PriceQuote, Verdict};

use crate::fake_sources::{reference_stats, FakePool, FakePrice};

fn settings() -> DashboardSettings {
    DashboardSettings {
        wallet: "kaspa:qintegration".into(),
        rig: "vast4090".into(),
        coin: "kas".into(),
        price_coin_id: "kaspa".into(),
        fallback_cost_usd: 5.0,
    }
}

fn temp_db() -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("rigwatch_it_{}.db", uuid::Uuid::new_v4()));
    p
}

async fn build(pool: &FakePool, price: &FakePrice, db: &Path) -> DashboardController {
    let store = CostStore::open(db).await.unwrap();
    DashboardController::new(
        Box::new(pool.clone()),
        Box::new(price.clone()),
        store,
        ProfitCalculator::default(),
        settings(),
    )
}

#[tokio::test]
async fn test_loss_scenario_end_to_end() {
    let db = temp_db();
    let pool = FakePool::new(reference_stats());
    let price = FakePrice::new(0.06);
    let ctrl = build(&pool, &price, &db).await;

    let snap = ctrl.refresh(None).await.unwrap();
    let profit = snap.profit.clone().unwrap();
    assert!((profit.income_usd - 0.75).abs() < 1e-12);
    assert!((profit.profit_usd + 4.25).abs() < 1e-12);
    assert_eq!(snap.verdict, Some(Verdict::Loss));
    assert_eq!(snap.cost.source, CostSource::Fallback);
    assert_eq!(pool.wallets(), vec!["kaspa:qintegration".to_string()]);

    ctrl.store().close().await;
    let _ = std::fs::remove_file(&db);
}

#[tokio::test]
async fn test_pool_outage_keeps_price_section() {
    let db = temp_db();
    let pool = FakePool::new(reference_stats());
    let price = FakePrice::new(0.06);
    pool.set_failing(Some(503));
    let ctrl = build(&pool, &price, &db).await;

    let snap = ctrl.refresh(None).await.unwrap();
    assert_eq!(snap.failure_kinds(), vec![FailureKind::Pool]);
    assert!(snap.profit.is_none());
    assert_eq!(snap.price, Some(PriceQuote { usd_per_coin: 0.06 }));
    assert_eq!(snap.notice.as_deref(), Some(DEGRADED_NOTICE));
    assert!(snap.failures[0].message.contains("503"));

    // Single attempt per refresh, no retries.
    assert_eq!(pool.calls(), 1);
    assert_eq!(price.calls(), 1);

    ctrl.store().close().await;
    let _ = std::fs::remove_file(&db);
}

#[tokio::test]
async fn test_recovery_on_next_refresh() {
    let db = temp_db();
    let pool = FakePool::new(reference_stats());
    let price = FakePrice::new(0.5);
    price.set_price(None);
    let ctrl = build(&pool, &price, &db).await;

    let degraded = ctrl.refresh(None).await.unwrap();
    assert_eq!(degraded.failure_kinds(), vec![FailureKind::Price]);
    assert_eq!(degraded.stats, Some(reference_stats()));

    price.set_price(Some(0.5));
    let healthy = ctrl.refresh(None).await.unwrap();
    assert!(healthy.failures.is_empty());
    assert_eq!(healthy.verdict, Some(Verdict::Profitable));
    assert!(healthy.timestamp_utc >= degraded.timestamp_utc);

    ctrl.store().close().await;
    let _ = std::fs::remove_file(&db);
}

#[tokio::test]
async fn test_saved_cost_survives_restart() {
    let db = temp_db();
    let pool = FakePool::new(reference_stats());
    let price = FakePrice::new(0.06);

    let ctrl = build(&pool, &price, &db).await;
    let saved = ctrl.save_cost(0.6).await.unwrap();
    assert_eq!(saved.cost.source, CostSource::Saved);
    ctrl.store().close().await;
    drop(ctrl);

    let restarted = build(&pool, &price, &db).await;
    let snap = restarted.refresh(None).await.unwrap();
    assert_eq!(snap.cost.usd, 0.6);
    assert_eq!(snap.cost.source, CostSource::Saved);
    assert_eq!(snap.verdict, Some(Verdict::Profitable));

    restarted.store().close().await;
    let _ = std::fs::remove_file(&db);
}

#[tokio::test]
async fn test_latest_dated_entry_drives_default() {
    let db = temp_db();
    let pool = FakePool::new(reference_stats());
    let price = FakePrice::new(0.06);
    let ctrl = build(&pool, &price, &db).await;

    let newer = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
    let older = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    ctrl.save_cost_on(newer, 3.0).await.unwrap();
    // Back-dated entry saved later must not become the default.
    ctrl.save_cost_on(older, 9.0).await.unwrap();

    let snap = ctrl.refresh(None).await.unwrap();
    assert_eq!(snap.cost.usd, 3.0);

    let history = ctrl.history(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, newer);
    assert_eq!(history[1].date, older);

    ctrl.store().close().await;
    let _ = std::fs::remove_file(&db);
}
