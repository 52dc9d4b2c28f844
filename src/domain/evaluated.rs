//! Evaluated Contract
//!
//! A put that passed every eligibility rule, with its derived metrics.
//! Percentages are stored already multiplied by 100 (35.0 = 35%); the strike
//! distance stays a fraction. Money is per 100-share contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedContract {
    pub ticker: String,
    pub expiration: NaiveDate,
    pub days_to_expiration: i64,
    pub strike: f64,
    pub bid: f64,
    pub last_price: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub delta: f64,
    /// Implied volatility in percent
    pub implied_volatility: f64,
    /// `(price - strike) / price`
    pub strike_distance: f64,
    /// Premium yield annualized over 365 days, in percent
    pub annual_return: f64,
    /// Strike exposure minus premium collected, in dollars
    pub net_risk: f64,
}

impl EvaluatedContract {
    /// Premium collected for one contract, in dollars
    pub fn premium_received(&self) -> f64 {
        self.last_price * 100.0
    }

    /// Strike distance in percent
    pub fn strike_distance_pct(&self) -> f64 {
        self.strike_distance * 100.0
    }
}
