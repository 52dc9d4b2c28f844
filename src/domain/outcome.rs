//! Ticker Outcome
//!
//! Per-ticker result of one screening pass. Discards and failures are not
//! errors: both render as an empty contract list downstream.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::evaluated::EvaluatedContract;

/// Why a ticker was dropped before (or instead of) contract screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DiscardReason {
    InvalidPrice { price: f64 },
    PriceAboveMaximum { price: f64, maximum: f64 },
    VolumeBelowMinimum { volume: u64, minimum: u64 },
    NoExpirations,
    NoValidIv,
    IvBelowMinimum { iv: f64, minimum: f64 },
}

impl DiscardReason {
    /// Stable short code for log fields
    pub fn code(&self) -> &'static str {
        match self {
            DiscardReason::InvalidPrice { .. } => "invalid_price",
            DiscardReason::PriceAboveMaximum { .. } => "price_above_maximum",
            DiscardReason::VolumeBelowMinimum { .. } => "volume_below_minimum",
            DiscardReason::NoExpirations => "no_expirations",
            DiscardReason::NoValidIv => "no_valid_iv",
            DiscardReason::IvBelowMinimum { .. } => "iv_below_minimum",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::InvalidPrice { price } => write!(f, "invalid price ${}", price),
            DiscardReason::PriceAboveMaximum { price, maximum } => {
                write!(f, "price ${:.2} exceeds maximum ${:.2}", price, maximum)
            }
            DiscardReason::VolumeBelowMinimum { volume, minimum } => {
                write!(f, "average volume {} < {}", volume, minimum)
            }
            DiscardReason::NoExpirations => write!(f, "no option expirations available"),
            DiscardReason::NoValidIv => write!(f, "no valid options to compute IV"),
            DiscardReason::IvBelowMinimum { iv, minimum } => {
                write!(f, "average IV {:.2}% < {:.2}%", iv, minimum)
            }
        }
    }
}

/// Outcome of analyzing one ticker
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    /// Passed the gate; ranked contracts (possibly none qualified)
    Screened(Vec<EvaluatedContract>),
    /// Dropped by the volatility gate or the IV floor
    Discarded(DiscardReason),
    /// Market data could not be fetched
    Failed(String),
}

impl TickerOutcome {
    pub fn contracts(&self) -> &[EvaluatedContract] {
        match self {
            TickerOutcome::Screened(contracts) => contracts,
            _ => &[],
        }
    }

    pub fn into_contracts(self) -> Vec<EvaluatedContract> {
        match self {
            TickerOutcome::Screened(contracts) => contracts,
            _ => Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TickerOutcome::Failed(_))
    }
}

/// A ticker paired with its outcome; what the notifier receives
#[derive(Debug, Clone, PartialEq)]
pub struct TickerResult {
    pub ticker: String,
    pub outcome: TickerOutcome,
}

impl TickerResult {
    pub fn new(ticker: impl Into<String>, outcome: TickerOutcome) -> Self {
        Self {
            ticker: ticker.into(),
            outcome,
        }
    }

    pub fn contracts(&self) -> &[EvaluatedContract] {
        self.outcome.contracts()
    }
}

/// Total contracts across a group's results
pub fn total_contracts(results: &[TickerResult]) -> usize {
    results.iter().map(|r| r.contracts().len()).sum()
}
