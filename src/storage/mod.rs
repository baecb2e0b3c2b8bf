//! Persistence layer.
//!
//! Append-only SQLite log of daily operating costs per rig. The table is
//! created on open if absent. The store handle is owned explicitly by the
//! controller and closed on shutdown.

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{MonitorError, Result};
use crate::types::CostRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cost_log (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    date     TEXT    NOT NULL,
    rig      TEXT    NOT NULL,
    coin     TEXT    NOT NULL,
    cost_usd REAL    NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_cost_log_rig_date ON cost_log (rig, date)";

/// Handle to the cost log.
///
/// Backed by a single-connection pool: one writer is assumed, and an
/// in-memory database only lives as long as its connection.
#[derive(Clone)]
pub struct CostStore {
    pool: SqlitePool,
}

impl CostStore {
    /// Open (or create) the cost log at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let store = Self::connect(options).await?;
        info!(path = %path.display(), "Cost store opened");
        Ok(store)
    }

    /// Non-durable store, for tests and dry runs.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Append a cost entry. Duplicates for the same rig/date are accepted.
    pub async fn insert(
        &self,
        date: NaiveDate,
        rig: &str,
        coin: &str,
        cost_usd: f64,
    ) -> Result<CostRecord> {
        let result = sqlx::query(
            "INSERT INTO cost_log (date, rig, coin, cost_usd) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(rig)
        .bind(coin)
        .bind(cost_usd)
        .execute(&self.pool)
        .await?;

        let record = CostRecord {
            id: result.last_insert_rowid(),
            date,
            rig: rig.to_string(),
            coin: coin.to_string(),
            cost_usd,
        };
        debug!(id = record.id, rig, %date, cost_usd, "Cost entry saved");
        Ok(record)
    }

    /// Most recently dated entry for `rig`. On equal dates the most
    /// recently inserted row wins.
    pub async fn latest(&self, rig: &str) -> Result<Option<CostRecord>> {
        let row = sqlx::query(
            "SELECT id, date, rig, coin, cost_usd FROM cost_log
             WHERE rig = ?1
             ORDER BY date DESC, id DESC
             LIMIT 1",
        )
        .bind(rig)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_row).transpose()
    }

    /// Cost of the latest entry for `rig`, or 0.0 if it has none.
    pub async fn latest_cost(&self, rig: &str) -> Result<f64> {
        Ok(self.latest(rig).await?.map(|r| r.cost_usd).unwrap_or(0.0))
    }

    /// Up to `limit` entries for `rig`, newest first.
    pub async fn history(&self, rig: &str, limit: u32) -> Result<Vec<CostRecord>> {
        let rows = sqlx::query(
            "SELECT id, date, rig, coin, cost_usd FROM cost_log
             WHERE rig = ?1
             ORDER BY date DESC, id DESC
             LIMIT ?2",
        )
        .bind(rig)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_row).collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Cost store closed");
    }
}

fn decode_row(row: &SqliteRow) -> Result<CostRecord> {
    let raw_date: String = row.try_get("date")?;
    let date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|e| {
        MonitorError::ParseFailure {
            origin: "cost_log",
            detail: format!("bad date {raw_date:?}: {e}"),
        }
    })?;

    Ok(CostRecord {
        id: row.try_get("id")?,
        date,
        rig: row.try_get("rig")?,
        coin: row.try_get("coin")?,
        cost_usd: row.try_get("cost_usd")?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
