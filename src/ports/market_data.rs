//! Market Data Port
//!
//! What the screener needs from a quote/options provider. Every method may
//! fail; the application layer turns a failure into an empty result for the
//! ticker concerned.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::{OptionChain, UnderlyingSnapshot};

/// Market data error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("No data for {0}")]
    NotFound(String),
}

/// Market data port trait
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Current price and average volume of the underlying
    async fn fetch_underlying(&self, ticker: &str) -> Result<UnderlyingSnapshot, MarketDataError>;

    /// Listed option expirations, nearest first
    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>, MarketDataError>;

    /// Puts and calls for one expiration.
    ///
    /// `as_of` is the evaluation instant; anything the provider derives
    /// from time to expiry (estimated greeks) is measured from it.
    async fn fetch_option_chain(
        &self,
        ticker: &str,
        expiration: NaiveDate,
        as_of: DateTime<Utc>,
    ) -> Result<OptionChain, MarketDataError>;
}
