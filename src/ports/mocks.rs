//! In-memory port implementations for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::events::{EventSink, ScreenEvent};
use super::market_data::{MarketDataError, MarketDataPort};
use super::notifier::{NotifierPort, NotifyError};
use crate::domain::{OptionChain, TickerResult, UnderlyingSnapshot};

/// Canned data for one ticker
#[derive(Debug, Clone)]
pub struct TickerFixture {
    pub underlying: UnderlyingSnapshot,
    pub chains: Vec<(NaiveDate, OptionChain)>,
}

impl TickerFixture {
    pub fn new(underlying: UnderlyingSnapshot) -> Self {
        Self {
            underlying,
            chains: Vec::new(),
        }
    }

    pub fn with_chain(mut self, expiration: NaiveDate, chain: OptionChain) -> Self {
        self.chains.push((expiration, chain));
        self
    }
}

/// Market data served from fixtures, recording every call
#[derive(Debug, Default, Clone)]
pub struct InMemoryMarketData {
    fixtures: Arc<Mutex<HashMap<String, TickerFixture>>>,
    failures: Arc<Mutex<HashMap<String, MarketDataError>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve a fixture for its ticker
    pub fn with_ticker(self, fixture: TickerFixture) -> Self {
        self.fixtures
            .lock()
            .unwrap()
            .insert(fixture.underlying.ticker.clone(), fixture);
        self
    }

    /// Builder method to make every call for `ticker` fail
    pub fn with_failure(self, ticker: &str, error: MarketDataError) -> Self {
        self.failures.lock().unwrap().insert(ticker.to_string(), error);
        self
    }

    /// Get all recorded calls, as `method:ticker[:expiration]`
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fixture(&self, ticker: &str) -> Result<TickerFixture, MarketDataError> {
        if let Some(error) = self.failures.lock().unwrap().get(ticker) {
            return Err(error.clone());
        }
        self.fixtures
            .lock()
            .unwrap()
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))
    }
}

#[async_trait]
impl MarketDataPort for InMemoryMarketData {
    async fn fetch_underlying(&self, ticker: &str) -> Result<UnderlyingSnapshot, MarketDataError> {
        self.record(format!("underlying:{}", ticker));
        Ok(self.fixture(ticker)?.underlying)
    }

    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        self.record(format!("expirations:{}", ticker));
        Ok(self.fixture(ticker)?.chains.iter().map(|(d, _)| *d).collect())
    }

    async fn fetch_option_chain(
        &self,
        ticker: &str,
        expiration: NaiveDate,
        _as_of: DateTime<Utc>,
    ) -> Result<OptionChain, MarketDataError> {
        self.record(format!("chain:{}:{}", ticker, expiration));
        self.fixture(ticker)?
            .chains
            .into_iter()
            .find(|(d, _)| *d == expiration)
            .map(|(_, chain)| chain)
            .ok_or_else(|| MarketDataError::NotFound(format!("{} {}", ticker, expiration)))
    }
}

/// One recorded notification
#[derive(Debug, Clone)]
pub struct Delivery {
    pub destination: String,
    pub description: String,
    pub results: Vec<TickerResult>,
}

/// Notifier that stores what it was asked to send
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the call, then fail it
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierPort for RecordingNotifier {
    async fn notify(
        &self,
        destination: &str,
        description: &str,
        results: &[TickerResult],
    ) -> Result<usize, NotifyError> {
        self.deliveries.lock().unwrap().push(Delivery {
            destination: destination.to_string(),
            description: description.to_string(),
            results: results.to_vec(),
        });
        if self.fail {
            return Err(NotifyError::Http("connection refused".into()));
        }
        Ok(1)
    }
}

/// Event sink that keeps every event
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ScreenEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScreenEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ScreenEvent) {
        self.events.lock().unwrap().push(event);
    }
}
