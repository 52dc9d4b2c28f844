//! Message formatting and chunking for Discord
//!
//! Discord rejects message content over 2000 characters, so oversized
//! reports are split into ordered chunks no longer than the configured
//! chunk size, breaking at line boundaries where possible.

use std::fmt::Write as _;

use crate::domain::{total_contracts, EvaluatedContract, TickerResult};

/// Hard limit Discord enforces on `content`
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

pub fn format_contract_line(contract: &EvaluatedContract) -> String {
    format!(
        "- Strike: ${:.2} | Expiration: {} ({} days) | Premium: ${:.2} | Annual return: {:.2}% | Delta: {:.2} | IV: {:.2}% | Distance: {:.2}% | Risk: ${:.2}\n",
        contract.strike,
        contract.expiration,
        contract.days_to_expiration,
        contract.last_price,
        contract.annual_return,
        contract.delta,
        contract.implied_volatility,
        contract.strike_distance_pct(),
        contract.net_risk,
    )
}

/// Render a group's results as one message.
///
/// Tickers with no contracts are left out of the body; when no ticker has
/// any, the whole report collapses to a single "no contracts" line.
pub fn format_report(description: &str, results: &[TickerResult]) -> String {
    if total_contracts(results) == 0 {
        return format!("No contracts found for {}.", description);
    }

    let mut message = format!("Best contracts for {}:\n", description);
    for result in results {
        let contracts = result.contracts();
        if contracts.is_empty() {
            continue;
        }
        let _ = write!(message, "\n**{}**:\n", result.ticker);
        for contract in contracts {
            message.push_str(&format_contract_line(contract));
        }
    }
    message
}

/// Split a message for delivery.
///
/// Messages within the Discord limit are sent whole. Longer ones are cut
/// into chunks of at most `chunk_size` characters; lines that do not fit a
/// chunk on their own are hard-split.
pub fn split_message(message: &str, chunk_size: usize) -> Vec<String> {
    if message.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return vec![message.to_string()];
    }
    let chunk_size = chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len <= chunk_size {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= chunk_size {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(chunk_size) {
            if piece.len() == chunk_size {
                chunks.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscardReason, TickerOutcome};
    use chrono::NaiveDate;
    use regex::Regex;

    fn contract(ticker: &str, strike: f64) -> EvaluatedContract {
        EvaluatedContract {
            ticker: ticker.to_string(),
            expiration: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            days_to_expiration: 30,
            strike,
            bid: 1.20,
            last_price: 1.25,
            volume: 310,
            open_interest: 2200,
            delta: -0.15,
            implied_volatility: 31.0,
            strike_distance: 0.0678,
            annual_return: 10.87,
            net_risk: strike * 100.0 - 125.0,
        }
    }

    fn screened(ticker: &str, count: usize) -> TickerResult {
        let contracts = (0..count).map(|i| contract(ticker, 140.0 - i as f64)).collect();
        TickerResult::new(ticker, TickerOutcome::Screened(contracts))
    }

    #[test]
    fn test_contract_line_format() {
        let line = format_contract_line(&contract("AAPL", 140.0));
        let pattern = Regex::new(
            r"^- Strike: \$140\.00 \| Expiration: 2026-11-20 \(30 days\) \| Premium: \$1\.25 \| Annual return: 10\.87% \| Delta: -0\.15 \| IV: 31\.00% \| Distance: 6\.78% \| Risk: \$13875\.00\n$",
        )
        .unwrap();
        assert!(pattern.is_match(&line), "unexpected line: {}", line);
    }

    #[test]
    fn test_report_skips_empty_tickers() {
        let results = vec![
            screened("AAPL", 2),
            TickerResult::new("MSFT", TickerOutcome::Screened(vec![])),
            TickerResult::new("TSLA", TickerOutcome::Discarded(DiscardReason::NoExpirations)),
        ];
        let report = format_report("NASDAQ-100", &results);

        assert!(report.starts_with("Best contracts for NASDAQ-100:\n"));
        assert!(report.contains("\n**AAPL**:\n"));
        assert!(!report.contains("MSFT"));
        assert!(!report.contains("TSLA"));
        assert_eq!(Regex::new(r"(?m)^- Strike").unwrap().find_iter(&report).count(), 2);
    }

    #[test]
    fn test_empty_report() {
        let results = vec![TickerResult::new("MSFT", TickerOutcome::Screened(vec![]))];
        assert_eq!(
            format_report("NASDAQ-100", &results),
            "No contracts found for NASDAQ-100."
        );
        assert_eq!(format_report("NASDAQ-100", &[]), "No contracts found for NASDAQ-100.");
    }

    #[test]
    fn test_short_message_is_not_split() {
        let message = "x".repeat(DISCORD_MESSAGE_LIMIT);
        assert_eq!(split_message(&message, 1900), vec![message]);
    }

    #[test]
    fn test_long_report_splits_at_lines() {
        let results: Vec<TickerResult> =
            ["AAPL", "MSFT", "NVDA", "AMZN"].iter().map(|t| screened(t, 5)).collect();
        let report = format_report("NASDAQ-100", &results);
        assert!(report.chars().count() > DISCORD_MESSAGE_LIMIT);

        let chunks = split_message(&report, 1900);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1900));
        assert_eq!(chunks.concat(), report);
        // Every chunk after the first starts on a fresh line
        for pair in chunks.windows(2) {
            assert!(pair[0].ends_with('\n'));
        }
    }

    #[test]
    fn test_oversized_line_is_hard_split() {
        let message = format!("header\n{}\nfooter\n", "é".repeat(4500));
        let chunks = split_message(&message, 1900);

        assert!(chunks.iter().all(|c| c.chars().count() <= 1900));
        assert_eq!(chunks.concat(), message);
        assert_eq!(chunks[0], "header\n");
    }
}
