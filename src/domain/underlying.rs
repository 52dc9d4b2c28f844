//! Underlying snapshot

use serde::{Deserialize, Serialize};

/// Price and liquidity of the underlying stock at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderlyingSnapshot {
    pub ticker: String,
    /// Current price; must be finite and > 0 for the ticker to be screened
    pub current_price: f64,
    /// Average daily share volume
    pub average_volume: u64,
    /// Last session close, when the provider reports it
    pub previous_close: Option<f64>,
}

impl UnderlyingSnapshot {
    pub fn new(ticker: impl Into<String>, current_price: f64, average_volume: u64) -> Self {
        Self {
            ticker: ticker.into(),
            current_price,
            average_volume,
            previous_close: None,
        }
    }

    pub fn with_previous_close(mut self, previous_close: f64) -> Self {
        self.previous_close = Some(previous_close);
        self
    }

    pub fn has_valid_price(&self) -> bool {
        self.current_price.is_finite() && self.current_price > 0.0
    }
}
