//! External data sources.
//!
//! Defines the `PoolSource` and `PriceSource` traits and the HTTP clients
//! implementing them. The controller only sees the traits, so tests can
//! substitute fakes for the network.

pub mod pool;
pub mod price;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MinerStats, PriceQuote};

/// Abstraction over mining-pool statistics endpoints.
///
/// Implementors hide which pool API variant is in use and always
/// return normalized [`MinerStats`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Fetch current statistics for a wallet. Single attempt, no retries.
    async fn fetch(&self, wallet: &str) -> Result<MinerStats>;
}

/// Abstraction over price-quote endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the USD price of a coin. Every failure mode is reported
    /// as `MonitorError::PriceUnavailable`.
    async fn fetch(&self, coin_id: &str) -> Result<PriceQuote>;
}
