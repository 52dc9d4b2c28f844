//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the short PUT screener.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::adapters::discord::{format_contract_line, DiscordWebhookNotifier};
use crate::adapters::stdout::StdoutNotifier;
use crate::adapters::telemetry::TracingSink;
use crate::adapters::yahoo::{YahooClient, YahooConfig};
use crate::application::{analyze_ticker, select_groups, DeliveryStatus, ScreenOrchestrator};
use crate::config::{load_config, Config, WEBHOOK_PLACEHOLDER};
use crate::domain::TickerOutcome;
use crate::ports::notifier::NotifierPort;

const DEFAULT_CONFIG: &str = "config/default.toml";

/// Short PUT option screener
#[derive(Parser, Debug)]
#[command(
    name = "shortput",
    version = env!("CARGO_PKG_VERSION"),
    about = "Screens equity option chains for short PUT candidates",
    long_about = "Filters each configured ticker through a volatility gate and a set of \
                  per-contract rules (delta, liquidity, premium, risk), ranks the survivors \
                  by annualized return and posts the best ones per group to Discord."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log at trace level (every contract verdict)
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen groups and send their reports
    Run(RunCmd),

    /// Screen a single ticker and print the selected contracts
    Analyze(AnalyzeCmd),

    /// Check a configuration file
    Validate(ValidateCmd),
}

impl Command {
    fn config_path(&self) -> &Path {
        match self {
            Command::Run(cmd) => &cmd.config,
            Command::Analyze(cmd) => &cmd.config,
            Command::Validate(cmd) => &cmd.config,
        }
    }
}

/// Screen configured groups
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Only run these groups (repeatable); all groups by default
    #[arg(short, long, value_name = "NAME")]
    pub group: Vec<String>,

    /// Print reports to stdout instead of posting them
    #[arg(long)]
    pub dry_run: bool,

    /// Evaluation instant for days-to-expiration (RFC 3339); now by default
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<DateTime<Utc>>,
}

/// Screen one ticker
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Ticker symbol (e.g., AAPL)
    #[arg(value_name = "TICKER")]
    pub ticker: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Group whose rules apply; the first group by default
    #[arg(short, long, value_name = "NAME")]
    pub group: Option<String>,

    /// Evaluation instant for days-to-expiration (RFC 3339); now by default
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<DateTime<Utc>>,

    /// Print selected contracts as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct ValidateCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let path = expand_path(app.command.config_path());
    let loaded = load_config(&path);

    let configured_level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(app.verbose, app.debug, &configured_level)?;

    let config = loaded.with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Analyze(cmd) => analyze_command(cmd, config).await,
        Command::Validate(_) => validate_command(&path, &config),
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

/// Initialize logging system
///
/// `RUST_LOG` wins, then the command-line flags, then `[logging] level`.
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        configured
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .with_context(|| format!("Invalid log level '{}'", fallback))?;

    fmt().with_env_filter(filter).with_target(false).init();

    Ok(())
}

fn market_data(config: &Config) -> Result<YahooClient> {
    YahooClient::with_config(YahooConfig::from(&config.market_data))
        .context("Failed to create market data client")
}

/// Handle run command
async fn run_command(cmd: RunCmd, config: Config) -> Result<()> {
    let groups = select_groups(&config, &cmd.group)?;

    let notifier: Arc<dyn NotifierPort> = if cmd.dry_run {
        tracing::warn!("DRY RUN mode - reports go to stdout, nothing is posted");
        Arc::new(StdoutNotifier::new(config.notifier.chunk_size))
    } else {
        Arc::new(
            DiscordWebhookNotifier::new(&config.notifier)
                .context("Failed to create Discord notifier")?,
        )
    };

    let mut orchestrator = ScreenOrchestrator::new(
        Arc::new(market_data(&config)?),
        notifier,
        Arc::new(TracingSink),
        config.screen.max_concurrent_tickers,
    )?;
    if let Some(as_of) = cmd.as_of {
        orchestrator = orchestrator.with_as_of(as_of);
    }

    tracing::info!(
        "Screening {} group(s) as of {}",
        groups.len(),
        orchestrator.as_of().to_rfc3339()
    );

    let reports = orchestrator.run_all(&groups).await;

    let mut undelivered = 0;
    for report in &reports {
        let delivery = match &report.delivery {
            DeliveryStatus::Delivered { messages } => format!("{} message(s) sent", messages),
            DeliveryStatus::Failed(reason) => {
                undelivered += 1;
                format!("not delivered: {}", reason)
            }
        };
        println!(
            "{}: {} contracts across {} tickers ({} failed), {}",
            report.group,
            report.total_contracts(),
            report.results.len(),
            report.failed_tickers().len(),
            delivery
        );
    }

    if undelivered > 0 {
        tracing::warn!("{} of {} group report(s) were not delivered", undelivered, reports.len());
    }

    Ok(())
}

/// Handle analyze command
async fn analyze_command(cmd: AnalyzeCmd, config: Config) -> Result<()> {
    let group = match &cmd.group {
        Some(name) => config
            .group(name)
            .with_context(|| format!("Unknown group '{}'", name))?,
        None => config
            .groups
            .first()
            .context("Configuration has no groups")?,
    };

    let ticker = cmd.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        bail!("Ticker cannot be empty");
    }

    let provider = market_data(&config)?;
    let as_of = cmd.as_of.unwrap_or_else(Utc::now);
    let outcome = analyze_ticker(&provider, &ticker, &group.rules, as_of, &TracingSink).await;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(outcome.contracts())?);
        return Ok(());
    }

    println!("{} with rules of group '{}' as of {}", ticker, group.name, as_of.to_rfc3339());
    match &outcome {
        TickerOutcome::Screened(contracts) if contracts.is_empty() => {
            println!("  No qualifying contracts");
        }
        TickerOutcome::Screened(contracts) => {
            for contract in contracts {
                print!("  {}", format_contract_line(contract));
            }
        }
        TickerOutcome::Discarded(reason) => println!("  Discarded: {}", reason),
        TickerOutcome::Failed(reason) => bail!("Analysis of {} failed: {}", ticker, reason),
    }

    Ok(())
}

/// Handle validate command
fn validate_command(path: &Path, config: &Config) -> Result<()> {
    println!("✓ {} is valid", path.display());
    println!(
        "  Market data: {} (timeout {}s, {} retries, delta estimation {})",
        config.market_data.api_url,
        config.market_data.timeout_secs,
        config.market_data.max_retries,
        if config.market_data.estimate_missing_delta { "on" } else { "off" }
    );
    println!("  Concurrency: {} tickers", config.screen.max_concurrent_tickers);

    for group in &config.groups {
        let webhook = match group.webhook_url() {
            Some(url) if url != WEBHOOK_PLACEHOLDER => "configured",
            _ => "MISSING",
        };
        println!(
            "  Group '{}': {} tickers, DTE {}-{}, top {}, webhook {}",
            group.name,
            group.tickers.len(),
            group.rules.min_days_to_expiration,
            group.rules.max_days_to_expiration,
            group.rules.top_contracts_per_ticker,
            webhook
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let app = CliApp::try_parse_from([
            "shortput",
            "run",
            "--group",
            "nasdaq_short_put",
            "--dry-run",
            "--as-of",
            "2026-10-18T00:00:00Z",
        ])
        .unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.group, vec!["nasdaq_short_put"]);
                assert!(cmd.dry_run);
                assert_eq!(cmd.config, PathBuf::from(DEFAULT_CONFIG));
                assert_eq!(cmd.as_of.unwrap().to_rfc3339(), "2026-10-18T00:00:00+00:00");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_analyze_with_global_flag() {
        let app = CliApp::try_parse_from(["shortput", "analyze", "aapl", "--json", "-v"]).unwrap();
        assert!(app.verbose);
        match app.command {
            Command::Analyze(cmd) => {
                assert_eq!(cmd.ticker, "aapl");
                assert!(cmd.json);
                assert!(cmd.group.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_as_of_is_rejected() {
        let result = CliApp::try_parse_from(["shortput", "run", "--as-of", "yesterday"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_path_keeps_relative_paths() {
        assert_eq!(expand_path(Path::new("config/default.toml")), PathBuf::from("config/default.toml"));
    }
}
