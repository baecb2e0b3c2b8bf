//! RIGWATCH: mining rig hashrate and profitability dashboard
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the cost store, wires the pool and price clients into the
//! controller, and serves the dashboard until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use rigwatch::config::AppConfig;
use rigwatch::dashboard;
use rigwatch::engine::controller::{secondary_from_config, DashboardController, DashboardSettings};
use rigwatch::engine::profit::ProfitCalculator;
use rigwatch::sources::pool::PoolStatsClient;
use rigwatch::sources::price::PriceClient;
use rigwatch::storage::CostStore;

const BANNER: &str = r#"
 ___ ___ _____      ___ _____ ___ _  _
| _ \_ _/ __\ \    / /_\_   _/ __| || |
|   /| | (_ |\ \/\/ / _ \| || (__| __ |
|_|_\___\___| \_/\_/_/ \_\_| \___|_||_|

  Mining rig hashrate & profitability dashboard
  v0.1.0
"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        rig = %cfg.rig.name,
        coin = %cfg.rig.coin,
        pool_api = ?cfg.pool.api,
        fallback_cost = cfg.cost.default_daily_usd,
        "RIGWATCH starting up"
    );

    // -- Initialise components -------------------------------------------

    let store = CostStore::open(&cfg.cost.db_path)
        .await
        .with_context(|| format!("Failed to open cost store at {}", cfg.cost.db_path))?;

    let pool = PoolStatsClient::new(
        cfg.pool.api,
        cfg.pool.url_template.clone(),
        Duration::from_secs(cfg.pool.timeout_secs),
    )?;

    let price_key = cfg.price.api_key_env.as_deref().and_then(|env| {
        match AppConfig::resolve_env(env) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e, "Price API key not available, using public endpoint");
                None
            }
        }
    });
    let price = PriceClient::new(
        cfg.price.base_url.clone(),
        price_key,
        Duration::from_secs(cfg.price.timeout_secs),
    )?;

    let controller = Arc::new(DashboardController::new(
        Box::new(pool),
        Box::new(price),
        store.clone(),
        ProfitCalculator::new(secondary_from_config(&cfg)),
        DashboardSettings::from_config(&cfg),
    ));

    // -- Serve -----------------------------------------------------------

    info!("Serving dashboard. Press Ctrl+C to stop.");
    let served = dashboard::serve(controller, cfg.dashboard.port, shutdown_signal()).await;

    store.close().await;
    served?;
    info!("RIGWATCH shut down cleanly.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rigwatch=info"));

    let json_logging = std::env::var("RIGWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
