//! Yahoo Finance API Client
//!
//! Async HTTP client for the unofficial v7 finance endpoints: quote,
//! option expirations and per-expiration chains.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::greeks::{black_scholes_delta, OptionSide};
use super::types::{OptionChainData, OptionData, OptionsResponse, QuoteResponse};
use crate::config::MarketDataSection;
use crate::domain::{OptionChain, OptionContract, UnderlyingSnapshot};
use crate::ports::market_data::{MarketDataError, MarketDataPort};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SECONDS_PER_YEAR: f64 = 365.0 * 86_400.0;

/// Yahoo client configuration
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Fill absent deltas with a Black-Scholes estimate
    pub estimate_missing_delta: bool,
    pub risk_free_rate: f64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self::from(&MarketDataSection::default())
    }
}

impl From<&MarketDataSection> for YahooConfig {
    fn from(section: &MarketDataSection) -> Self {
        Self {
            api_base_url: section.api_url.trim_end_matches('/').to_string(),
            timeout: section.timeout(),
            max_retries: section.max_retries,
            estimate_missing_delta: section.estimate_missing_delta,
            risk_free_rate: section.risk_free_rate,
        }
    }
}

/// Yahoo Finance market data client
#[derive(Debug, Clone)]
pub struct YahooClient {
    config: YahooConfig,
    http: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(YahooConfig::default())
    }

    pub fn with_config(config: YahooConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MarketDataError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn quote_url(&self, ticker: &str) -> String {
        format!("{}/quote?symbols={}", self.config.api_base_url, ticker)
    }

    fn options_url(&self, ticker: &str, expiration: Option<NaiveDate>) -> String {
        match expiration {
            Some(date) => format!(
                "{}/options/{}?date={}",
                self.config.api_base_url,
                ticker,
                expiration_timestamp(date)
            ),
            None => format!("{}/options/{}", self.config.api_base_url, ticker),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, MarketDataError> {
        let http = &self.http;
        let response = self
            .execute_with_retry(|| async move {
                http.get(url)
                    .send()
                    .await
                    .map_err(|e| MarketDataError::Http(e.to_string()))
            })
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Http(format!("API error {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, MarketDataError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, MarketDataError>>,
    {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    // 2s, 4s, 8s
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_secs(2u64.pow(attempt + 1));
                        tracing::warn!(
                            "Yahoo rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            attempts
                        );
                        last_error = Some(MarketDataError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(MarketDataError::Http(format!("Server error: {}", status)));
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MarketDataError::Http("Max retries exceeded".into())))
    }

    async fn fetch_options(
        &self,
        ticker: &str,
        expiration: Option<NaiveDate>,
    ) -> Result<OptionChainData, MarketDataError> {
        let response: OptionsResponse = self.get_json(&self.options_url(ticker, expiration)).await?;
        response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::NotFound(format!("options for {}", ticker)))
    }

    /// Convert the first options block; deltas are estimated from `as_of`
    fn build_chain(&self, data: &OptionChainData, expiration: NaiveDate, as_of: DateTime<Utc>) -> OptionChain {
        let spot = data.quote.price();
        let years = years_until(expiration, as_of);

        let Some(block) = data.options.first() else {
            return OptionChain::default();
        };

        OptionChain::new(
            self.convert_side(&block.puts, OptionSide::Put, spot, years),
            self.convert_side(&block.calls, OptionSide::Call, spot, years),
        )
    }

    fn convert_side(
        &self,
        rows: &[OptionData],
        side: OptionSide,
        spot: f64,
        years: f64,
    ) -> Vec<OptionContract> {
        rows.iter()
            .filter_map(OptionData::to_contract)
            .map(|mut contract| {
                if contract.delta.is_none() && self.config.estimate_missing_delta {
                    contract.delta = black_scholes_delta(
                        side,
                        spot,
                        contract.strike,
                        years,
                        contract.implied_volatility,
                        self.config.risk_free_rate,
                    );
                }
                contract
            })
            .collect()
    }
}

/// Expirations are requested as midnight UTC of the expiration date
fn expiration_timestamp(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

fn years_until(expiration: NaiveDate, now: DateTime<Utc>) -> f64 {
    let seconds = expiration_timestamp(expiration) - now.timestamp();
    seconds as f64 / SECONDS_PER_YEAR
}

#[async_trait]
impl MarketDataPort for YahooClient {
    async fn fetch_underlying(&self, ticker: &str) -> Result<UnderlyingSnapshot, MarketDataError> {
        let response: QuoteResponse = self.get_json(&self.quote_url(ticker)).await?;
        let quote = response
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::NotFound(ticker.to_string()))?;

        let mut snapshot = UnderlyingSnapshot::new(ticker, quote.price(), quote.average_volume());
        if let Some(close) = quote.regular_market_previous_close {
            snapshot = snapshot.with_previous_close(close);
        }
        Ok(snapshot)
    }

    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>, MarketDataError> {
        let data = self.fetch_options(ticker, None).await?;
        let mut expirations: Vec<NaiveDate> = data
            .expiration_dates
            .iter()
            .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
            .collect();
        expirations.sort();
        expirations.dedup();
        Ok(expirations)
    }

    async fn fetch_option_chain(
        &self,
        ticker: &str,
        expiration: NaiveDate,
        as_of: DateTime<Utc>,
    ) -> Result<OptionChain, MarketDataError> {
        let data = self.fetch_options(ticker, Some(expiration)).await?;
        Ok(self.build_chain(&data, expiration, as_of))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client(estimate: bool) -> YahooClient {
        YahooClient::with_config(YahooConfig {
            estimate_missing_delta: estimate,
            ..YahooConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_config_from_section() {
        let section = MarketDataSection {
            api_url: "http://localhost:9000/v7/finance/".to_string(),
            max_retries: 5,
            ..MarketDataSection::default()
        };
        let config = YahooConfig::from(&section);
        assert_eq!(config.api_base_url, "http://localhost:9000/v7/finance");
        assert_eq!(config.max_retries, 5);
        assert!(!config.estimate_missing_delta);
    }

    #[test]
    fn test_urls() {
        let client = client(false);
        assert_eq!(
            client.quote_url("AAPL"),
            "https://query1.finance.yahoo.com/v7/finance/quote?symbols=AAPL"
        );
        let date = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        assert_eq!(
            client.options_url("AAPL", Some(date)),
            "https://query1.finance.yahoo.com/v7/finance/options/AAPL?date=1795132800"
        );
    }

    #[test]
    fn test_years_until() {
        let expiration = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 21, 0, 0, 0).unwrap();
        let years = years_until(expiration, now);
        assert!((years - 30.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_delta_estimation_is_opt_in() {
        let row = OptionData {
            contract_symbol: None,
            strike: Some(90.0),
            bid: Some(0.5),
            last_price: Some(0.55),
            volume: Some(10),
            open_interest: Some(100),
            implied_volatility: Some(0.4),
            delta: None,
        };

        let plain = client(false).convert_side(&[row.clone()], OptionSide::Put, 100.0, 0.1);
        assert_eq!(plain[0].delta, None);

        let estimated = client(true).convert_side(&[row.clone()], OptionSide::Put, 100.0, 0.1);
        let delta = estimated[0].delta.unwrap();
        assert!(delta < 0.0 && delta > -0.5);

        let reported = OptionData {
            delta: Some(-0.12),
            ..row
        };
        let kept = client(true).convert_side(&[reported], OptionSide::Put, 100.0, 0.1);
        assert_eq!(kept[0].delta, Some(-0.12));
    }

    #[test]
    fn test_estimated_delta_follows_evaluation_instant() {
        let data: OptionChainData = serde_json::from_str(
            r#"{
                "quote": { "regularMarketPrice": 100.0 },
                "options": [{
                    "puts": [{ "strike": 90.0, "bid": 0.5, "lastPrice": 0.55, "impliedVolatility": 0.4 }],
                    "calls": []
                }]
            }"#,
        )
        .unwrap();
        let expiration = NaiveDate::from_ymd_opt(2026, 11, 20).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 11, 10, 0, 0, 0).unwrap();
        let client = client(true);

        let first = client.build_chain(&data, expiration, early);
        let again = client.build_chain(&data, expiration, early);
        assert_eq!(first, again);

        // Less time left pushes an OTM put's delta toward zero
        let near = client.build_chain(&data, expiration, late);
        let early_delta = first.puts[0].delta.unwrap();
        let late_delta = near.puts[0].delta.unwrap();
        assert!(late_delta > early_delta);
        assert!(late_delta < 0.0);
    }
}
