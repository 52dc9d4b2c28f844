//! Rule Parameters
//!
//! The per-group rule set applied by the volatility gate and the contract
//! screener. Default values mirror the NASDAQ-100 short PUT group.

use serde::{Deserialize, Serialize};

/// Eligibility thresholds for one ticker group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Shortest expiration considered (days, inclusive)
    pub min_days_to_expiration: i64,
    /// Longest expiration considered (days, inclusive)
    pub max_days_to_expiration: i64,
    /// Minimum annualized premium yield, in percent
    pub min_annual_return: f64,
    /// Lower delta bound (puts are negative, e.g. -0.20)
    pub target_delta_min: f64,
    /// Upper delta bound
    pub target_delta_max: f64,
    /// Minimum contracts traded today
    pub min_volume: u64,
    /// Minimum open interest
    pub min_open_interest: u64,
    /// Minimum bid per share
    pub min_bid: f64,
    /// Minimum last traded premium per share (0 disables the check)
    #[serde(default = "default_min_premium")]
    pub min_premium: f64,
    /// Account capital in dollars
    pub capital: f64,
    /// Largest fraction of capital one contract may put at risk
    pub max_risk_per_trade: f64,
    /// Minimum average ATM implied volatility of the underlying, in percent
    pub min_iv: f64,
    /// Minimum average daily share volume of the underlying
    pub min_volume_stock: u64,
    /// Maximum underlying price
    pub max_stock_price: f64,
    /// Minimum `(price - strike) / price`
    pub min_strike_distance: f64,
    /// Contracts kept per ticker after ranking
    pub top_contracts_per_ticker: usize,
}

fn default_min_premium() -> f64 {
    1.0
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_days_to_expiration: 20,
            max_days_to_expiration: 45,
            min_annual_return: 35.0,
            target_delta_min: -0.20,
            target_delta_max: 0.0,
            min_volume: 1,
            min_open_interest: 1,
            min_bid: 0.30,
            min_premium: default_min_premium(),
            capital: 60_000.0,
            max_risk_per_trade: 0.04, // 4% of capital per trade
            min_iv: 35.0,
            min_volume_stock: 150_000,
            max_stock_price: 170.0,
            min_strike_distance: 0.05, // strike at least 5% below spot
            top_contracts_per_ticker: 5,
        }
    }
}

impl RuleConfig {
    /// Dollar cap on net risk for a single contract
    pub fn max_risk_amount(&self) -> f64 {
        self.capital * self.max_risk_per_trade
    }

    pub fn with_dte_window(mut self, min_days: i64, max_days: i64) -> Self {
        self.min_days_to_expiration = min_days;
        self.max_days_to_expiration = max_days;
        self
    }

    pub fn with_delta_range(mut self, min: f64, max: f64) -> Self {
        self.target_delta_min = min;
        self.target_delta_max = max;
        self
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top_contracts_per_ticker = top;
        self
    }

    /// Validate rule invariants
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_days_to_expiration < 0 {
            return Err(ParamsError::Negative("min_days_to_expiration", self.min_days_to_expiration as f64));
        }
        if self.min_days_to_expiration > self.max_days_to_expiration {
            return Err(ParamsError::InvalidDteWindow {
                min: self.min_days_to_expiration,
                max: self.max_days_to_expiration,
            });
        }

        for (name, value) in [
            ("target_delta_min", self.target_delta_min),
            ("target_delta_max", self.target_delta_max),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite(name));
            }
        }
        if self.target_delta_min > self.target_delta_max {
            return Err(ParamsError::InvalidDeltaRange {
                min: self.target_delta_min,
                max: self.target_delta_max,
            });
        }

        for (name, value) in [
            ("min_annual_return", self.min_annual_return),
            ("min_bid", self.min_bid),
            ("min_premium", self.min_premium),
            ("capital", self.capital),
            ("max_risk_per_trade", self.max_risk_per_trade),
            ("min_iv", self.min_iv),
            ("max_stock_price", self.max_stock_price),
            ("min_strike_distance", self.min_strike_distance),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite(name));
            }
            if value < 0.0 {
                return Err(ParamsError::Negative(name, value));
            }
        }

        if self.top_contracts_per_ticker == 0 {
            return Err(ParamsError::InvalidTopCount);
        }
        Ok(())
    }
}

/// Rule validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid DTE window: min {min} > max {max}")]
    InvalidDteWindow { min: i64, max: i64 },
    #[error("Invalid delta range: min {min} > max {max}")]
    InvalidDeltaRange { min: f64, max: f64 },
    #[error("{0} must be >= 0, got {1}")]
    Negative(&'static str, f64),
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("top_contracts_per_ticker must be at least 1")]
    InvalidTopCount,
}
