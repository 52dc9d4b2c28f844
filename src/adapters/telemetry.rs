//! Tracing-backed event sink
//!
//! Maps screening events onto log levels: fetch failures at warn, gate
//! decisions at info, per-expiration detail at debug, per-contract verdicts
//! at trace.

use crate::ports::events::{EventSink, ScreenEvent};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: ScreenEvent) {
        match event {
            ScreenEvent::ExpirationSkipped {
                ticker,
                expiration,
                days_to_expiration,
            } => {
                tracing::debug!(
                    "{}: skipping expiration {} ({} days, outside window)",
                    ticker,
                    expiration,
                    days_to_expiration
                );
            }
            ScreenEvent::AtmIvSampled {
                ticker,
                expiration,
                strike,
                iv_pct,
            } => {
                tracing::debug!(
                    "{}: ATM IV {:.2}% at strike {:.2} for {}",
                    ticker,
                    iv_pct,
                    strike,
                    expiration
                );
            }
            ScreenEvent::VolatilityAccepted {
                ticker,
                current_price,
                average_volume,
                average_iv,
                samples,
            } => {
                tracing::info!(
                    "{}: price ${:.2}, avg volume {}, avg IV {:.2}% ({} samples)",
                    ticker,
                    current_price,
                    average_volume,
                    average_iv,
                    samples
                );
            }
            ScreenEvent::FetchFailed { ticker, error } => {
                tracing::warn!("Failed to fetch market data for {}: {}", ticker, error);
            }
            ScreenEvent::TickerDiscarded { ticker, reason } => {
                tracing::info!(ticker = %ticker, reason = reason.code(), "Discarded: {}", reason);
            }
            ScreenEvent::ContractRejected {
                ticker,
                expiration,
                strike,
                reason,
            } => {
                tracing::trace!("{}: put {:.2} {} rejected: {}", ticker, strike, expiration, reason);
            }
            ScreenEvent::ContractAccepted { contract } => {
                tracing::debug!(
                    "{}: put {:.2} {} accepted, annual return {:.2}%, delta {:.2}",
                    contract.ticker,
                    contract.strike,
                    contract.expiration,
                    contract.annual_return,
                    contract.delta
                );
            }
            ScreenEvent::ScreenCompleted {
                ticker,
                accepted,
                rejections,
            } => {
                tracing::debug!(
                    "{}: {} accepted, {} rejected (otm {}, distance {}, bid {}, last {}, premium {}, volume {}, oi {}, delta {}/{}, expired {}, return {}, risk {}), {} expirations out of window",
                    ticker,
                    accepted,
                    rejections.total(),
                    rejections.not_out_of_the_money,
                    rejections.strike_too_close,
                    rejections.bid_too_low,
                    rejections.no_last_price,
                    rejections.premium_too_low,
                    rejections.volume_too_low,
                    rejections.open_interest_too_low,
                    rejections.delta_invalid,
                    rejections.delta_out_of_range,
                    rejections.expired,
                    rejections.return_too_low,
                    rejections.risk_too_high,
                    rejections.expirations_out_of_window
                );
            }
            ScreenEvent::Selected {
                ticker,
                selected,
                qualifying,
            } => {
                tracing::info!("{}: selected {} of {} qualifying contracts", ticker, selected, qualifying);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiscardReason;
    use crate::ports::market_data::MarketDataError;

    #[test]
    fn test_emit_without_subscriber() {
        let sink = TracingSink;
        sink.emit(ScreenEvent::TickerDiscarded {
            ticker: "AAPL".to_string(),
            reason: DiscardReason::NoExpirations,
        });
        sink.emit(ScreenEvent::FetchFailed {
            ticker: "AAPL".to_string(),
            error: MarketDataError::RateLimited,
        });
        sink.emit(ScreenEvent::Selected {
            ticker: "AAPL".to_string(),
            selected: 0,
            qualifying: 0,
        });
    }
}
