//! Contract Screener
//!
//! Evaluates every put of every eligible expiration against the rule set.
//! Rules run in a fixed order and stop at the first failure; membership in
//! the result is the conjunction of all of them, the order only decides
//! which rejection counter moves.
//!
//! 1. strike below spot (out of the money)
//! 2. strike distance >= min_strike_distance
//! 3. bid >= min_bid
//! 4. last price > 0, and >= min_premium
//! 5. volume and open interest minimums
//! 6. delta present, non-zero, inside the target range
//! 7. days to expiration > 0, annualized return >= min_annual_return
//! 8. net risk <= capital * max_risk_per_trade

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EvaluatedContract, ExpirationChain, OptionContract};
use crate::ports::events::{EventSink, ScreenEvent};
use crate::strategy::params::RuleConfig;

const SHARES_PER_CONTRACT: f64 = 100.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// First rule a put failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotOutOfTheMoney,
    StrikeTooClose,
    BidTooLow,
    NoLastPrice,
    PremiumTooLow,
    VolumeTooLow,
    OpenInterestTooLow,
    DeltaInvalid,
    DeltaOutOfRange,
    Expired,
    ReturnTooLow,
    RiskTooHigh,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NotOutOfTheMoney => "strike at or above spot",
            RejectReason::StrikeTooClose => "strike distance below minimum",
            RejectReason::BidTooLow => "bid below minimum",
            RejectReason::NoLastPrice => "no positive last price",
            RejectReason::PremiumTooLow => "premium below minimum",
            RejectReason::VolumeTooLow => "volume below minimum",
            RejectReason::OpenInterestTooLow => "open interest below minimum",
            RejectReason::DeltaInvalid => "delta missing or zero",
            RejectReason::DeltaOutOfRange => "delta outside target range",
            RejectReason::Expired => "expired or same-day",
            RejectReason::ReturnTooLow => "annual return below minimum",
            RejectReason::RiskTooHigh => "net risk above limit",
        };
        f.write_str(text)
    }
}

/// Rejection counters for one ticker's screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RejectTally {
    pub not_out_of_the_money: u32,
    pub strike_too_close: u32,
    pub bid_too_low: u32,
    pub no_last_price: u32,
    pub premium_too_low: u32,
    pub volume_too_low: u32,
    pub open_interest_too_low: u32,
    pub delta_invalid: u32,
    pub delta_out_of_range: u32,
    pub expired: u32,
    pub return_too_low: u32,
    pub risk_too_high: u32,
    /// Expirations skipped for falling outside the DTE window
    pub expirations_out_of_window: u32,
}

impl RejectTally {
    pub fn record(&mut self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::NotOutOfTheMoney => &mut self.not_out_of_the_money,
            RejectReason::StrikeTooClose => &mut self.strike_too_close,
            RejectReason::BidTooLow => &mut self.bid_too_low,
            RejectReason::NoLastPrice => &mut self.no_last_price,
            RejectReason::PremiumTooLow => &mut self.premium_too_low,
            RejectReason::VolumeTooLow => &mut self.volume_too_low,
            RejectReason::OpenInterestTooLow => &mut self.open_interest_too_low,
            RejectReason::DeltaInvalid => &mut self.delta_invalid,
            RejectReason::DeltaOutOfRange => &mut self.delta_out_of_range,
            RejectReason::Expired => &mut self.expired,
            RejectReason::ReturnTooLow => &mut self.return_too_low,
            RejectReason::RiskTooHigh => &mut self.risk_too_high,
        };
        *counter += 1;
    }

    /// Contracts rejected, across all reasons
    pub fn total(&self) -> u32 {
        self.not_out_of_the_money
            + self.strike_too_close
            + self.bid_too_low
            + self.no_last_price
            + self.premium_too_low
            + self.volume_too_low
            + self.open_interest_too_low
            + self.delta_invalid
            + self.delta_out_of_range
            + self.expired
            + self.return_too_low
            + self.risk_too_high
    }
}

/// Where a put sits: its ticker and expiration
#[derive(Debug, Clone, Copy)]
pub struct ContractContext<'a> {
    pub ticker: &'a str,
    pub expiration: NaiveDate,
    pub days_to_expiration: i64,
    pub current_price: f64,
}

/// Apply every rule to one put
pub fn evaluate_contract(
    ctx: &ContractContext<'_>,
    contract: &OptionContract,
    config: &RuleConfig,
) -> Result<EvaluatedContract, RejectReason> {
    let price = ctx.current_price;
    let strike = contract.strike;

    // NaN strikes fall through to the distance check below
    if strike >= price {
        return Err(RejectReason::NotOutOfTheMoney);
    }

    let strike_distance = (price - strike) / price;
    if strike_distance.is_nan() || strike_distance < config.min_strike_distance {
        return Err(RejectReason::StrikeTooClose);
    }

    if contract.bid.is_nan() || contract.bid < config.min_bid {
        return Err(RejectReason::BidTooLow);
    }
    if contract.last_price.is_nan() || contract.last_price <= 0.0 {
        return Err(RejectReason::NoLastPrice);
    }
    if contract.last_price < config.min_premium {
        return Err(RejectReason::PremiumTooLow);
    }

    if contract.volume < config.min_volume {
        return Err(RejectReason::VolumeTooLow);
    }
    if contract.open_interest < config.min_open_interest {
        return Err(RejectReason::OpenInterestTooLow);
    }

    let delta = match contract.delta {
        Some(d) if d != 0.0 && !d.is_nan() => d,
        _ => return Err(RejectReason::DeltaInvalid),
    };
    if delta < config.target_delta_min || delta > config.target_delta_max {
        return Err(RejectReason::DeltaOutOfRange);
    }

    if ctx.days_to_expiration <= 0 {
        return Err(RejectReason::Expired);
    }
    let annual_return = annualized_return(contract.last_price, price, ctx.days_to_expiration);
    if !annual_return.is_finite() || annual_return < config.min_annual_return {
        return Err(RejectReason::ReturnTooLow);
    }

    let net_risk = net_risk(strike, contract.last_price);
    if !net_risk.is_finite() || net_risk > config.max_risk_amount() {
        return Err(RejectReason::RiskTooHigh);
    }

    Ok(EvaluatedContract {
        ticker: ctx.ticker.to_string(),
        expiration: ctx.expiration,
        days_to_expiration: ctx.days_to_expiration,
        strike,
        bid: contract.bid,
        last_price: contract.last_price,
        volume: contract.volume,
        open_interest: contract.open_interest,
        delta,
        implied_volatility: contract.implied_volatility * 100.0,
        strike_distance,
        annual_return,
        net_risk,
    })
}

/// Premium yield over the holding period, scaled to 365 days, in percent.
///
/// `days_to_expiration` must be positive.
pub fn annualized_return(last_price: f64, current_price: f64, days_to_expiration: i64) -> f64 {
    let period_return = last_price * SHARES_PER_CONTRACT / current_price;
    period_return * (DAYS_PER_YEAR / days_to_expiration as f64)
}

/// Loss if the underlying goes to zero, net of premium collected
pub fn net_risk(strike: f64, last_price: f64) -> f64 {
    strike * SHARES_PER_CONTRACT - last_price * SHARES_PER_CONTRACT
}

/// Screen every put of every expiration inside the DTE window
pub fn screen_contracts(
    ticker: &str,
    expirations: &[ExpirationChain],
    current_price: f64,
    config: &RuleConfig,
    sink: &dyn EventSink,
) -> Vec<EvaluatedContract> {
    let mut accepted = Vec::new();
    let mut tally = RejectTally::default();

    for chain in expirations {
        if !chain.within_window(config.min_days_to_expiration, config.max_days_to_expiration) {
            tally.expirations_out_of_window += 1;
            continue;
        }

        let ctx = ContractContext {
            ticker,
            expiration: chain.expiration,
            days_to_expiration: chain.days_to_expiration,
            current_price,
        };

        for put in &chain.puts {
            match evaluate_contract(&ctx, put, config) {
                Ok(contract) => {
                    sink.emit(ScreenEvent::ContractAccepted {
                        contract: contract.clone(),
                    });
                    accepted.push(contract);
                }
                Err(reason) => {
                    tally.record(reason);
                    sink.emit(ScreenEvent::ContractRejected {
                        ticker: ticker.to_string(),
                        expiration: chain.expiration,
                        strike: put.strike,
                        reason,
                    });
                }
            }
        }
    }

    sink.emit(ScreenEvent::ScreenCompleted {
        ticker: ticker.to_string(),
        accepted: accepted.len(),
        rejections: tally,
    });
    accepted
}
