//! Coin price client (CoinGecko `simple/price` shape).
//!
//! Response: `{ "<coin_id>": { "usd": <f64> } }`.
//! Any failure is folded into `PriceUnavailable`; the caller decides
//! what a missing price means for the cycle.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::PriceSource;
use crate::error::{MonitorError, Result};
use crate::types::PriceQuote;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

#[derive(Debug, Deserialize)]
struct CoinQuote {
    #[serde(default)]
    usd: Option<f64>,
}

/// Extract the USD quote for `coin_id` from a raw response body.
pub fn parse_quote(coin_id: &str, body: &[u8]) -> Result<PriceQuote> {
    let quotes: HashMap<String, CoinQuote> = serde_json::from_slice(body)
        .map_err(|e| MonitorError::PriceUnavailable(format!("malformed response: {e}")))?;

    let usd = quotes
        .get(coin_id)
        .and_then(|q| q.usd)
        .ok_or_else(|| MonitorError::PriceUnavailable(format!("no USD quote for {coin_id}")))?;

    if !usd.is_finite() || usd <= 0.0 {
        return Err(MonitorError::PriceUnavailable(format!(
            "non-positive USD quote for {coin_id}: {usd}"
        )));
    }

    Ok(PriceQuote { usd_per_coin: usd })
}

pub struct PriceClient {
    http: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl PriceClient {
    /// `api_key` is optional; the public endpoint works without one
    /// at a lower rate limit.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("RIGWATCH/0.1.0")
            .build()
            .context("Failed to build HTTP client for price API")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.map(SecretString::new),
        })
    }

    fn endpoint(&self, coin_id: &str) -> String {
        format!(
            "{}?ids={}&vs_currencies=usd",
            self.base_url.trim_end_matches('?'),
            urlencoding::encode(coin_id),
        )
    }
}

#[async_trait]
impl PriceSource for PriceClient {
    async fn fetch(&self, coin_id: &str) -> Result<PriceQuote> {
        let url = self.endpoint(coin_id);
        debug!(url = %url, "Fetching coin price");

        let mut req = self.http.get(&url);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key.expose_secret().as_str());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| MonitorError::PriceUnavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), coin_id, "Price API returned an error status");
            return Err(MonitorError::PriceUnavailable(format!("HTTP {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| MonitorError::PriceUnavailable(format!("body read failed: {e}")))?;

        let quote = parse_quote(coin_id, &body)?;
        debug!(coin_id, usd = quote.usd_per_coin, "Price fetched");
        Ok(quote)
    }
}
