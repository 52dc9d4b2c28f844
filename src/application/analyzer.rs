//! Ticker Analyzer
//!
//! One ticker's full pass: fetch the quote, check price and volume, fetch
//! the chains, run the volatility gate, screen the puts, rank them. The
//! screening half is pure and works on a snapshot.

use chrono::{DateTime, Utc};

use crate::domain::{DiscardReason, ExpirationChain, TickerOutcome, UnderlyingSnapshot};
use crate::ports::events::{EventSink, ScreenEvent};
use crate::ports::market_data::{MarketDataError, MarketDataPort};
use crate::strategy::{
    check_underlying, evaluate_volatility, screen_contracts, select_top, RuleConfig, VolatilityVerdict,
};

/// Everything the screen needs about one ticker, pinned to one instant
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub underlying: UnderlyingSnapshot,
    pub expirations: Vec<ExpirationChain>,
}

/// Screen an already-fetched snapshot.
///
/// Gate, then the `min_iv` floor, then per-contract rules, then top-N.
pub fn screen_snapshot(
    snapshot: &MarketSnapshot,
    config: &RuleConfig,
    sink: &dyn EventSink,
) -> TickerOutcome {
    let ticker = &snapshot.underlying.ticker;

    let profile = match evaluate_volatility(&snapshot.underlying, &snapshot.expirations, config, sink) {
        VolatilityVerdict::Accepted(profile) => profile,
        VolatilityVerdict::Discarded(reason) => return TickerOutcome::Discarded(reason),
    };

    if !profile.meets_min_iv(config) {
        let reason = DiscardReason::IvBelowMinimum {
            iv: profile.average_implied_volatility,
            minimum: config.min_iv,
        };
        sink.emit(ScreenEvent::TickerDiscarded {
            ticker: ticker.clone(),
            reason: reason.clone(),
        });
        return TickerOutcome::Discarded(reason);
    }

    let qualifying = screen_contracts(
        ticker,
        &snapshot.expirations,
        profile.current_price,
        config,
        sink,
    );
    let qualifying_count = qualifying.len();
    let selected = select_top(qualifying, config);

    sink.emit(ScreenEvent::Selected {
        ticker: ticker.clone(),
        selected: selected.len(),
        qualifying: qualifying_count,
    });
    TickerOutcome::Screened(selected)
}

/// Fetch quote, expirations and the chains the screen will look at.
///
/// Chains are only requested for expirations inside the DTE window; the
/// rest are kept as empty chains so the gate still counts them.
pub async fn fetch_snapshot(
    provider: &dyn MarketDataPort,
    ticker: &str,
    config: &RuleConfig,
    as_of: DateTime<Utc>,
) -> Result<MarketSnapshot, MarketDataError> {
    let underlying = provider.fetch_underlying(ticker).await?;
    fetch_chains(provider, ticker, underlying, config, as_of).await
}

async fn fetch_chains(
    provider: &dyn MarketDataPort,
    ticker: &str,
    underlying: UnderlyingSnapshot,
    config: &RuleConfig,
    as_of: DateTime<Utc>,
) -> Result<MarketSnapshot, MarketDataError> {
    let dates = provider.fetch_expirations(ticker).await?;

    let mut expirations = Vec::with_capacity(dates.len());
    for date in dates {
        let skeleton = ExpirationChain::unfetched(date, as_of);
        if !skeleton.within_window(config.min_days_to_expiration, config.max_days_to_expiration) {
            expirations.push(skeleton);
            continue;
        }
        let chain = provider.fetch_option_chain(ticker, date, as_of).await?;
        expirations.push(ExpirationChain::new(date, as_of, chain));
    }

    Ok(MarketSnapshot {
        underlying,
        expirations,
    })
}

/// Analyze one ticker; provider failures become `Failed`, never errors.
///
/// The quote is checked against the price and volume rules before any
/// options data is requested.
pub async fn analyze_ticker(
    provider: &dyn MarketDataPort,
    ticker: &str,
    config: &RuleConfig,
    as_of: DateTime<Utc>,
    sink: &dyn EventSink,
) -> TickerOutcome {
    let underlying = match provider.fetch_underlying(ticker).await {
        Ok(underlying) => underlying,
        Err(e) => return fetch_failed(ticker, e, sink),
    };

    if let Err(reason) = check_underlying(&underlying, config) {
        sink.emit(ScreenEvent::TickerDiscarded {
            ticker: ticker.to_string(),
            reason: reason.clone(),
        });
        return TickerOutcome::Discarded(reason);
    }

    match fetch_chains(provider, ticker, underlying, config, as_of).await {
        Ok(snapshot) => screen_snapshot(&snapshot, config, sink),
        Err(e) => fetch_failed(ticker, e, sink),
    }
}

fn fetch_failed(ticker: &str, error: MarketDataError, sink: &dyn EventSink) -> TickerOutcome {
    let message = error.to_string();
    sink.emit(ScreenEvent::FetchFailed {
        ticker: ticker.to_string(),
        error,
    });
    TickerOutcome::Failed(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptionChain, OptionContract};
    use crate::ports::mocks::{InMemoryMarketData, RecordingSink, TickerFixture};
    use chrono::{Days, NaiveDate, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    fn expiration_in(days: u64) -> NaiveDate {
        as_of().date_naive() + Days::new(days)
    }

    fn chain(strike: f64, iv: f64) -> OptionChain {
        let put = OptionContract::new(strike)
            .with_quote(1.20, 1.25)
            .with_liquidity(300, 2000)
            .with_delta(-0.15)
            .with_iv(iv);
        let atm = OptionContract::new(150.0).with_quote(4.0, 4.1).with_iv(iv);
        OptionChain::new(vec![put, atm.clone()], vec![atm])
    }

    fn rules() -> RuleConfig {
        RuleConfig {
            min_annual_return: 10.0,
            min_iv: 20.0,
            min_volume_stock: 1_000_000,
            capital: 400_000.0,
            ..RuleConfig::default()
        }
    }

    fn provider() -> InMemoryMarketData {
        InMemoryMarketData::new().with_ticker(
            TickerFixture::new(UnderlyingSnapshot::new("AAPL", 150.0, 2_000_000))
                .with_chain(expiration_in(7), chain(140.0, 0.30))
                .with_chain(expiration_in(30), chain(140.0, 0.30))
                .with_chain(expiration_in(90), chain(140.0, 0.30)),
        )
    }

    #[tokio::test]
    async fn test_fetches_only_in_window_chains() {
        let provider = provider();
        let snapshot = fetch_snapshot(&provider, "AAPL", &rules(), as_of()).await.unwrap();

        assert_eq!(snapshot.expirations.len(), 3);
        assert_eq!(
            provider.get_calls(),
            vec![
                "underlying:AAPL".to_string(),
                "expirations:AAPL".to_string(),
                format!("chain:AAPL:{}", expiration_in(30)),
            ]
        );
        assert!(snapshot.expirations[0].puts.is_empty());
        assert_eq!(snapshot.expirations[1].days_to_expiration, 30);
    }

    #[tokio::test]
    async fn test_analyze_ticker_screens_and_ranks() {
        let sink = RecordingSink::new();
        let outcome = analyze_ticker(&provider(), "AAPL", &rules(), as_of(), &sink).await;

        let contracts = outcome.contracts();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].strike, 140.0);
        assert_eq!(contracts[0].days_to_expiration, 30);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            ScreenEvent::Selected { selected: 1, qualifying: 1, .. }
        )));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_failed() {
        let provider = InMemoryMarketData::new().with_failure("AAPL", MarketDataError::RateLimited);
        let sink = RecordingSink::new();
        let outcome = analyze_ticker(&provider, "AAPL", &rules(), as_of(), &sink).await;
        assert!(outcome.is_failure());
        assert!(outcome.contracts().is_empty());
        assert_eq!(
            sink.events(),
            vec![ScreenEvent::FetchFailed {
                ticker: "AAPL".to_string(),
                error: MarketDataError::RateLimited,
            }]
        );
    }

    #[tokio::test]
    async fn test_price_capped_ticker_skips_options_requests() {
        let provider = InMemoryMarketData::new().with_ticker(
            TickerFixture::new(UnderlyingSnapshot::new("BKNG", 1000.0, 2_000_000))
                .with_chain(expiration_in(30), chain(900.0, 0.30)),
        );
        let sink = RecordingSink::new();
        let outcome = analyze_ticker(&provider, "BKNG", &rules(), as_of(), &sink).await;

        assert_eq!(
            outcome,
            TickerOutcome::Discarded(DiscardReason::PriceAboveMaximum {
                price: 1000.0,
                maximum: 170.0
            })
        );
        assert_eq!(provider.get_calls(), vec!["underlying:BKNG".to_string()]);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            ScreenEvent::TickerDiscarded { ticker, .. } if ticker == "BKNG"
        )));
    }

    #[tokio::test]
    async fn test_thin_ticker_skips_options_requests() {
        let provider = InMemoryMarketData::new().with_ticker(
            TickerFixture::new(UnderlyingSnapshot::new("THIN", 50.0, 10_000))
                .with_chain(expiration_in(30), chain(45.0, 0.30)),
        );
        let outcome = analyze_ticker(&provider, "THIN", &rules(), as_of(), &RecordingSink::new()).await;

        assert!(matches!(
            outcome,
            TickerOutcome::Discarded(DiscardReason::VolumeBelowMinimum { volume: 10_000, .. })
        ));
        assert_eq!(provider.get_calls(), vec!["underlying:THIN".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_ticker_fails_without_panicking() {
        let outcome = analyze_ticker(&provider(), "ZZZZ", &rules(), as_of(), &RecordingSink::new()).await;
        assert!(matches!(outcome, TickerOutcome::Failed(_)));
    }

    #[test]
    fn test_iv_floor_discards_after_gate() {
        let snapshot = MarketSnapshot {
            underlying: UnderlyingSnapshot::new("AAPL", 150.0, 2_000_000),
            expirations: vec![ExpirationChain::new(expiration_in(30), as_of(), chain(140.0, 0.10))],
        };
        let sink = RecordingSink::new();
        let outcome = screen_snapshot(&snapshot, &rules(), &sink);

        match outcome {
            TickerOutcome::Discarded(DiscardReason::IvBelowMinimum { iv, minimum }) => {
                assert!((iv - 10.0).abs() < 1e-9);
                assert_eq!(minimum, 20.0);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // The screener never ran
        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, ScreenEvent::ScreenCompleted { .. })));
    }

    #[test]
    fn test_no_expirations_is_discarded() {
        let snapshot = MarketSnapshot {
            underlying: UnderlyingSnapshot::new("AAPL", 150.0, 2_000_000),
            expirations: vec![],
        };
        assert_eq!(
            screen_snapshot(&snapshot, &rules(), &RecordingSink::new()),
            TickerOutcome::Discarded(DiscardReason::NoExpirations)
        );
    }
}
