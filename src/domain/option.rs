//! Option Chain Types
//!
//! Raw contracts as delivered by the market data provider, grouped per
//! expiration with days-to-expiration pinned to an evaluation instant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// A single listed option as provided by the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Strike price
    pub strike: f64,
    /// Best bid
    pub bid: f64,
    /// Last traded price (premium per share)
    pub last_price: f64,
    /// Contracts traded today
    pub volume: u64,
    /// Outstanding contracts
    pub open_interest: u64,
    /// Delta, when the feed reports (or the adapter estimates) one
    pub delta: Option<f64>,
    /// Implied volatility as a fraction (0.35 = 35%)
    pub implied_volatility: f64,
}

impl OptionContract {
    pub fn new(strike: f64) -> Self {
        Self {
            strike,
            bid: 0.0,
            last_price: 0.0,
            volume: 0,
            open_interest: 0,
            delta: None,
            implied_volatility: 0.0,
        }
    }

    pub fn with_quote(mut self, bid: f64, last_price: f64) -> Self {
        self.bid = bid;
        self.last_price = last_price;
        self
    }

    pub fn with_liquidity(mut self, volume: u64, open_interest: u64) -> Self {
        self.volume = volume;
        self.open_interest = open_interest;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn with_iv(mut self, implied_volatility: f64) -> Self {
        self.implied_volatility = implied_volatility;
        self
    }
}

/// Puts and calls for one expiration, as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    pub puts: Vec<OptionContract>,
    pub calls: Vec<OptionContract>,
}

impl OptionChain {
    pub fn new(puts: Vec<OptionContract>, calls: Vec<OptionContract>) -> Self {
        Self { puts, calls }
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.calls.is_empty()
    }
}

/// One expiration's chain with its days-to-expiration resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ExpirationChain {
    pub expiration: NaiveDate,
    pub days_to_expiration: i64,
    pub puts: Vec<OptionContract>,
    pub calls: Vec<OptionContract>,
}

impl ExpirationChain {
    /// Build a chain, computing days-to-expiration relative to `as_of`
    pub fn new(expiration: NaiveDate, as_of: DateTime<Utc>, chain: OptionChain) -> Self {
        Self {
            expiration,
            days_to_expiration: days_to_expiration(expiration, as_of),
            puts: chain.puts,
            calls: chain.calls,
        }
    }

    /// Expiration known to exist but whose contracts were not fetched
    pub fn unfetched(expiration: NaiveDate, as_of: DateTime<Utc>) -> Self {
        Self::new(expiration, as_of, OptionChain::default())
    }

    /// Whether days-to-expiration falls inside `[min_days, max_days]`
    pub fn within_window(&self, min_days: i64, max_days: i64) -> bool {
        self.days_to_expiration >= min_days && self.days_to_expiration <= max_days
    }
}

/// Whole days from `as_of` until 00:00 UTC of the expiration date, floored.
///
/// An expiration later today already counts as -1.
pub fn days_to_expiration(expiration: NaiveDate, as_of: DateTime<Utc>) -> i64 {
    let expiry_start = expiration.and_time(chrono::NaiveTime::MIN).and_utc();
    (expiry_start - as_of).num_seconds().div_euclid(SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_to_expiration_at_midnight() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(days_to_expiration(date(2026, 11, 17), as_of), 30);
    }

    #[test]
    fn test_days_to_expiration_floors_partial_days() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 18, 14, 30, 0).unwrap();
        assert_eq!(days_to_expiration(date(2026, 11, 17), as_of), 29);
    }

    #[test]
    fn test_same_day_expiration_is_negative() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        assert_eq!(days_to_expiration(date(2026, 10, 18), as_of), -1);
    }

    #[test]
    fn test_window_is_inclusive() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        let chain = ExpirationChain::unfetched(date(2026, 11, 7), as_of);
        assert_eq!(chain.days_to_expiration, 20);
        assert!(chain.within_window(20, 45));
        assert!(!chain.within_window(21, 45));
        assert!(chain.puts.is_empty() && chain.calls.is_empty());
    }
}
