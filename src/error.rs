//! Error taxonomy for the fetch → compute → persist pipeline.
//!
//! Every variant maps onto a [`FailureKind`] so the controller can turn
//! errors into visible, non-fatal entries on the snapshot.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::types::{Failure, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Pool API answered with a non-success HTTP status.
    #[error("pool API returned HTTP {0}")]
    PoolUnavailable(u16),

    /// Pool API could not be reached (connect, timeout, body read).
    #[error("could not reach pool: {0}")]
    PoolUnreachable(String),

    /// Any failure of the price endpoint.
    #[error("price quote unavailable: {0}")]
    PriceUnavailable(String),

    /// Payload did not have the expected shape.
    #[error("malformed {origin} payload: {detail}")]
    ParseFailure { origin: &'static str, detail: String },

    #[error("cost store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("invalid daily cost: {0} (must be a finite, non-negative USD amount)")]
    InvalidCost(f64),
}

impl MonitorError {
    /// Which section of the dashboard this failure belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PoolUnavailable(_) | Self::PoolUnreachable(_) => FailureKind::Pool,
            Self::PriceUnavailable(_) => FailureKind::Price,
            Self::ParseFailure { origin, .. } => match *origin {
                "pool" => FailureKind::Pool,
                "price" => FailureKind::Price,
                _ => FailureKind::Store,
            },
            Self::Store(_) | Self::InvalidCost(_) => FailureKind::Store,
        }
    }

    /// Snapshot entry describing this error.
    pub fn to_failure(&self) -> Failure {
        Failure { kind: self.kind(), message: self.to_string() }
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCost(_) => StatusCode::BAD_REQUEST,
            Self::PoolUnavailable(_) | Self::PoolUnreachable(_) | Self::PriceUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::ParseFailure { .. } | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
