//! Screening Events
//!
//! Structured diagnostics emitted by the pure screening core. The core never
//! logs; it reports to an injected [`EventSink`] and the caller decides what
//! to do with each event.

use chrono::NaiveDate;

use crate::domain::{DiscardReason, EvaluatedContract};
use crate::ports::market_data::MarketDataError;
use crate::strategy::contract_screener::{RejectReason, RejectTally};

/// A single diagnostic event
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// Expiration left out of the DTE window
    ExpirationSkipped {
        ticker: String,
        expiration: NaiveDate,
        days_to_expiration: i64,
    },
    /// ATM implied volatility sampled for one side of one expiration
    AtmIvSampled {
        ticker: String,
        expiration: NaiveDate,
        strike: f64,
        iv_pct: f64,
    },
    /// Average ATM IV computed; the gate passed
    VolatilityAccepted {
        ticker: String,
        current_price: f64,
        average_volume: u64,
        average_iv: f64,
        samples: usize,
    },
    /// Provider call failed; the ticker is reported as failed
    FetchFailed {
        ticker: String,
        error: MarketDataError,
    },
    /// Ticker dropped before contract screening
    TickerDiscarded {
        ticker: String,
        reason: DiscardReason,
    },
    /// One put failed a rule
    ContractRejected {
        ticker: String,
        expiration: NaiveDate,
        strike: f64,
        reason: RejectReason,
    },
    /// One put passed every rule
    ContractAccepted { contract: EvaluatedContract },
    /// Screen of all eligible expirations finished
    ScreenCompleted {
        ticker: String,
        accepted: usize,
        rejections: RejectTally,
    },
    /// Ranking kept `selected` of `qualifying` contracts
    Selected {
        ticker: String,
        selected: usize,
        qualifying: usize,
    },
}

/// Destination for screening events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScreenEvent);
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ScreenEvent) {}
}
