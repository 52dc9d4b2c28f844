//! Screen Orchestrator
//!
//! Runs every ticker of a group through the analyzer on a bounded task pool,
//! gathers the outcomes in configured order and hands them to the notifier.
//! Groups run one after another; nothing one group does can stop the next.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::analyzer::analyze_ticker;
use crate::config::{Config, GroupSection};
use crate::domain::{total_contracts, TickerOutcome, TickerResult};
use crate::ports::events::EventSink;
use crate::ports::market_data::MarketDataPort;
use crate::ports::notifier::NotifierPort;
use crate::strategy::RuleConfig;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Unknown group: {0}")]
    UnknownGroup(String),
}

/// What happened to a group's notification
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStatus {
    /// Sent in this many messages
    Delivered { messages: usize },
    /// Notifier error, already logged
    Failed(String),
}

/// Result of one group run
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: String,
    /// One entry per configured ticker, in configured order
    pub results: Vec<TickerResult>,
    pub delivery: DeliveryStatus,
}

impl GroupReport {
    pub fn total_contracts(&self) -> usize {
        total_contracts(&self.results)
    }

    pub fn failed_tickers(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.outcome.is_failure())
            .map(|r| r.ticker.as_str())
            .collect()
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self.delivery, DeliveryStatus::Delivered { .. })
    }
}

/// Coordinates market data, screening and notification for configured groups
pub struct ScreenOrchestrator {
    market_data: Arc<dyn MarketDataPort>,
    notifier: Arc<dyn NotifierPort>,
    sink: Arc<dyn EventSink>,
    max_concurrent: usize,
    as_of: DateTime<Utc>,
}

impl ScreenOrchestrator {
    pub fn new(
        market_data: Arc<dyn MarketDataPort>,
        notifier: Arc<dyn NotifierPort>,
        sink: Arc<dyn EventSink>,
        max_concurrent: usize,
    ) -> Result<Self, OrchestratorError> {
        if max_concurrent == 0 {
            return Err(OrchestratorError::ConfigError(
                "max_concurrent_tickers must be > 0".into(),
            ));
        }

        Ok(Self {
            market_data,
            notifier,
            sink,
            max_concurrent,
            as_of: Utc::now(),
        })
    }

    /// Pin the evaluation instant used for days-to-expiration
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// Screen every ticker of a group; outcomes keep the configured order
    pub async fn screen_group(&self, tickers: &[String], rules: &RuleConfig) -> Vec<TickerResult> {
        let rules = Arc::new(rules.clone());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for (index, ticker) in tickers.iter().enumerate() {
            let ticker = ticker.trim().to_string();
            let provider = Arc::clone(&self.market_data);
            let sink = Arc::clone(&self.sink);
            let rules = Arc::clone(&rules);
            let semaphore = Arc::clone(&semaphore);
            let as_of = self.as_of;

            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        analyze_ticker(provider.as_ref(), &ticker, &rules, as_of, sink.as_ref()).await
                    }
                    Err(e) => TickerOutcome::Failed(format!("worker pool closed: {}", e)),
                };
                (index, outcome)
            });
        }

        // Slots start as failures so a panicked task still yields an entry
        let mut results: Vec<TickerResult> = tickers
            .iter()
            .map(|t| TickerResult::new(t.trim(), TickerOutcome::Failed("analysis task aborted".into())))
            .collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => results[index].outcome = outcome,
                Err(e) => tracing::error!("Ticker task error: {}", e),
            }
        }

        results
    }

    /// Screen a group and deliver its report
    pub async fn run_group(&self, group: &GroupSection) -> GroupReport {
        tracing::info!(
            "Processing group {} ({} tickers): {}",
            group.name,
            group.tickers.len(),
            group.description
        );

        let results = self.screen_group(&group.tickers, &group.rules).await;
        let total = total_contracts(&results);
        let failed = results.iter().filter(|r| r.outcome.is_failure()).count();
        tracing::info!(
            "Group {}: {} contracts selected, {} tickers failed",
            group.name,
            total,
            failed
        );

        let destination = group.webhook_url().unwrap_or_default();
        let delivery = match self
            .notifier
            .notify(&destination, &group.description, &results)
            .await
        {
            Ok(messages) => DeliveryStatus::Delivered { messages },
            Err(e) => {
                tracing::error!("Notification failed for group {}: {}", group.name, e);
                DeliveryStatus::Failed(e.to_string())
            }
        };

        GroupReport {
            group: group.name.clone(),
            results,
            delivery,
        }
    }

    /// Run groups in sequence
    pub async fn run_all(&self, groups: &[&GroupSection]) -> Vec<GroupReport> {
        let mut reports = Vec::with_capacity(groups.len());
        for group in groups {
            reports.push(self.run_group(group).await);
        }
        reports
    }
}

/// Pick groups by name, or all of them when no name is given
pub fn select_groups<'a>(
    config: &'a Config,
    names: &[String],
) -> Result<Vec<&'a GroupSection>, OrchestratorError> {
    if names.is_empty() {
        return Ok(config.groups.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            config
                .group(name)
                .ok_or_else(|| OrchestratorError::UnknownGroup(name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::domain::{OptionChain, OptionContract, UnderlyingSnapshot};
    use crate::ports::events::NullSink;
    use crate::ports::market_data::MarketDataError;
    use crate::ports::mocks::{InMemoryMarketData, TickerFixture};
    use crate::ports::notifier::{MockNotifierPort, NotifyError};
    use chrono::{Days, NaiveDate, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    fn expiration() -> NaiveDate {
        as_of().date_naive() + Days::new(30)
    }

    fn fixture(ticker: &str, price: f64) -> TickerFixture {
        let put = OptionContract::new(price * 0.9)
            .with_quote(1.50, 1.60)
            .with_liquidity(500, 4000)
            .with_delta(-0.12)
            .with_iv(0.40);
        let atm = OptionContract::new(price).with_quote(5.0, 5.1).with_iv(0.40);
        TickerFixture::new(UnderlyingSnapshot::new(ticker, price, 5_000_000))
            .with_chain(expiration(), OptionChain::new(vec![put, atm.clone()], vec![atm]))
    }

    fn group() -> GroupSection {
        let toml = r#"
[[groups]]
name = "tech"
description = "Tech"
tickers = ["AAPL", "BAD", "MSFT"]
webhook = "https://discord.com/api/webhooks/1/abc"

[groups.rules]
min_days_to_expiration = 20
max_days_to_expiration = 45
min_annual_return = 10.0
target_delta_min = -0.20
target_delta_max = 0.0
min_volume = 1
min_open_interest = 1
min_bid = 0.30
capital = 500000.0
max_risk_per_trade = 0.04
min_iv = 20.0
min_volume_stock = 1000000
max_stock_price = 170.0
min_strike_distance = 0.05
top_contracts_per_ticker = 5
"#;
        parse_config(toml).unwrap().groups.remove(0)
    }

    fn market_data() -> Arc<InMemoryMarketData> {
        Arc::new(
            InMemoryMarketData::new()
                .with_ticker(fixture("AAPL", 100.0))
                .with_ticker(fixture("MSFT", 120.0))
                .with_failure("BAD", MarketDataError::Http("timeout".into())),
        )
    }

    fn orchestrator(notifier: MockNotifierPort) -> ScreenOrchestrator {
        ScreenOrchestrator::new(market_data(), Arc::new(notifier), Arc::new(NullSink), 2)
            .unwrap()
            .with_as_of(as_of())
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = ScreenOrchestrator::new(
            market_data(),
            Arc::new(MockNotifierPort::new()),
            Arc::new(NullSink),
            0,
        );
        assert!(matches!(result, Err(OrchestratorError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_run_group_keeps_order_and_isolates_failure() {
        let mut notifier = MockNotifierPort::new();
        notifier
            .expect_notify()
            .withf(|destination, description, results| {
                destination == "https://discord.com/api/webhooks/1/abc"
                    && description == "Tech"
                    && results.len() == 3
            })
            .times(1)
            .returning(|_, _, _| Ok(1));

        let report = orchestrator(notifier).run_group(&group()).await;

        let tickers: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "BAD", "MSFT"]);
        assert_eq!(report.results[0].contracts().len(), 1);
        assert!(report.results[1].outcome.is_failure());
        assert_eq!(report.results[2].contracts().len(), 1);
        assert_eq!(report.failed_tickers(), vec!["BAD"]);
        assert_eq!(report.delivery, DeliveryStatus::Delivered { messages: 1 });
    }

    #[tokio::test]
    async fn test_notification_failure_is_reported_not_fatal() {
        let mut notifier = MockNotifierPort::new();
        notifier
            .expect_notify()
            .times(2)
            .returning(|_, _, _| Err(NotifyError::Http("503".into())));

        let group = group();
        let reports = orchestrator(notifier).run_all(&[&group, &group]).await;

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(!report.is_delivered());
            assert_eq!(report.total_contracts(), 2);
        }
    }

    #[tokio::test]
    async fn test_screen_group_is_idempotent() {
        let orchestrator = orchestrator(MockNotifierPort::new());
        let group = group();
        let first = orchestrator.screen_group(&group.tickers, &group.rules).await;
        let second = orchestrator.screen_group(&group.tickers, &group.rules).await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_groups() {
        let mut config = parse_config(include_str!("../../config/default.toml")).unwrap();
        config.groups.push(group());

        assert_eq!(select_groups(&config, &[]).unwrap().len(), config.groups.len());
        let picked = select_groups(&config, &["tech".to_string()]).unwrap();
        assert_eq!(picked[0].name, "tech");
        assert!(matches!(
            select_groups(&config, &["nope".to_string()]),
            Err(OrchestratorError::UnknownGroup(_))
        ));
    }
}
