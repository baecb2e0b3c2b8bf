//! Dashboard API route handlers.
//!
//! All endpoints return JSON. The controller is shared via `Arc`; every
//! request runs its own one-shot refresh or save.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::engine::controller::DashboardController;
use crate::error::MonitorError;
use crate::types::{CostRecord, Snapshot};

/// Default and maximum number of cost entries returned by `/api/costs`.
const DEFAULT_HISTORY_LIMIT: u32 = 30;
const MAX_HISTORY_LIMIT: u32 = 365;

pub type AppState = Arc<DashboardController>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    /// Unsaved cost currently typed into the cost input.
    pub cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SaveCostRequest {
    pub cost_usd: f64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/snapshot
pub async fn get_snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<Snapshot>, MonitorError> {
    Ok(Json(state.refresh(query.cost).await?))
}

/// POST /api/cost
pub async fn post_cost(
    State(state): State<AppState>,
    Json(req): Json<SaveCostRequest>,
) -> Result<Json<Snapshot>, MonitorError> {
    Ok(Json(state.save_cost(req.cost_usd).await?))
}

/// GET /api/costs
pub async fn get_costs(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CostRecord>>, MonitorError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(MAX_HISTORY_LIMIT);
    Ok(Json(state.history(limit).await?))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}
