//! Volatility Gate
//!
//! Decides whether a ticker is worth screening. The underlying must have a
//! sane price below the configured cap and enough average volume, and its
//! at-the-money options must yield at least one positive implied volatility.
//!
//! Average IV = mean over eligible expirations of the ATM put IV and the ATM
//! call IV, where ATM is the strike closest to the current price.

use crate::domain::{DiscardReason, ExpirationChain, OptionContract, UnderlyingSnapshot};
use crate::ports::events::{EventSink, ScreenEvent};
use crate::strategy::params::RuleConfig;

/// Underlying that passed the gate
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityProfile {
    pub ticker: String,
    pub current_price: f64,
    pub average_volume: u64,
    /// Mean ATM implied volatility, in percent
    pub average_implied_volatility: f64,
    /// Number of IV values averaged
    pub samples: usize,
}

impl VolatilityProfile {
    /// Check the rule set's IV floor
    pub fn meets_min_iv(&self, config: &RuleConfig) -> bool {
        self.average_implied_volatility >= config.min_iv
    }
}

/// Gate decision
#[derive(Debug, Clone, PartialEq)]
pub enum VolatilityVerdict {
    Accepted(VolatilityProfile),
    Discarded(DiscardReason),
}

impl VolatilityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VolatilityVerdict::Accepted(_))
    }
}

/// Run the gate for one ticker
pub fn evaluate_volatility(
    underlying: &UnderlyingSnapshot,
    expirations: &[ExpirationChain],
    config: &RuleConfig,
    sink: &dyn EventSink,
) -> VolatilityVerdict {
    let verdict = gate(underlying, expirations, config, sink);
    match &verdict {
        VolatilityVerdict::Accepted(profile) => sink.emit(ScreenEvent::VolatilityAccepted {
            ticker: profile.ticker.clone(),
            current_price: profile.current_price,
            average_volume: profile.average_volume,
            average_iv: profile.average_implied_volatility,
            samples: profile.samples,
        }),
        VolatilityVerdict::Discarded(reason) => sink.emit(ScreenEvent::TickerDiscarded {
            ticker: underlying.ticker.clone(),
            reason: reason.clone(),
        }),
    }
    verdict
}

/// Checks that need only the quote: valid price, price cap, share volume.
///
/// Callers run this before requesting any options data.
pub fn check_underlying(underlying: &UnderlyingSnapshot, config: &RuleConfig) -> Result<(), DiscardReason> {
    let price = underlying.current_price;
    if !underlying.has_valid_price() {
        return Err(DiscardReason::InvalidPrice { price });
    }
    if price > config.max_stock_price {
        return Err(DiscardReason::PriceAboveMaximum {
            price,
            maximum: config.max_stock_price,
        });
    }
    if underlying.average_volume < config.min_volume_stock {
        return Err(DiscardReason::VolumeBelowMinimum {
            volume: underlying.average_volume,
            minimum: config.min_volume_stock,
        });
    }
    Ok(())
}

fn gate(
    underlying: &UnderlyingSnapshot,
    expirations: &[ExpirationChain],
    config: &RuleConfig,
    sink: &dyn EventSink,
) -> VolatilityVerdict {
    if let Err(reason) = check_underlying(underlying, config) {
        return VolatilityVerdict::Discarded(reason);
    }
    let price = underlying.current_price;
    if expirations.is_empty() {
        return VolatilityVerdict::Discarded(DiscardReason::NoExpirations);
    }

    let mut iv_values = Vec::new();
    for chain in expirations {
        if !chain.within_window(config.min_days_to_expiration, config.max_days_to_expiration) {
            sink.emit(ScreenEvent::ExpirationSkipped {
                ticker: underlying.ticker.clone(),
                expiration: chain.expiration,
                days_to_expiration: chain.days_to_expiration,
            });
            continue;
        }

        for side in [&chain.puts, &chain.calls] {
            let Some(atm) = at_the_money(side, price) else {
                continue;
            };
            let iv_pct = atm.implied_volatility * 100.0;
            if iv_pct > 0.0 {
                sink.emit(ScreenEvent::AtmIvSampled {
                    ticker: underlying.ticker.clone(),
                    expiration: chain.expiration,
                    strike: atm.strike,
                    iv_pct,
                });
                iv_values.push(iv_pct);
            }
        }
    }

    if iv_values.is_empty() {
        return VolatilityVerdict::Discarded(DiscardReason::NoValidIv);
    }

    let average = iv_values.iter().sum::<f64>() / iv_values.len() as f64;
    VolatilityVerdict::Accepted(VolatilityProfile {
        ticker: underlying.ticker.clone(),
        current_price: price,
        average_volume: underlying.average_volume,
        average_implied_volatility: average,
        samples: iv_values.len(),
    })
}

/// Contract whose strike is closest to `price`; the first one wins ties
pub fn at_the_money(contracts: &[OptionContract], price: f64) -> Option<&OptionContract> {
    let mut best: Option<(&OptionContract, f64)> = None;
    for contract in contracts {
        let diff = (contract.strike - price).abs();
        if diff.is_nan() {
            continue;
        }
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((contract, diff)),
        }
    }
    best.map(|(contract, _)| contract)
}
