//! Daily profitability.
//!
//! income = coin/day × USD/coin, profit = income − daily cost. An optional
//! fixed exchange rate converts the profit into a second currency. No
//! validation happens here; callers guard their inputs.

use crate::types::{ProfitResult, SecondaryAmount};

/// Fixed-rate secondary currency.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryCurrency {
    pub code: String,
    /// Units of `code` per USD.
    pub usd_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ProfitCalculator {
    secondary: Option<SecondaryCurrency>,
}

impl ProfitCalculator {
    pub fn new(secondary: Option<SecondaryCurrency>) -> Self {
        Self { secondary }
    }

    pub fn compute(
        &self,
        estimated_daily_coin: f64,
        usd_per_coin: f64,
        daily_cost_usd: f64,
    ) -> ProfitResult {
        let income_usd = estimated_daily_coin * usd_per_coin;
        let profit_usd = income_usd - daily_cost_usd;

        ProfitResult {
            income_usd,
            profit_usd,
            profit_secondary: self.secondary.as_ref().map(|s| SecondaryAmount {
                currency: s.code.clone(),
                amount: profit_usd * s.usd_rate,
            }),
        }
    }
}
