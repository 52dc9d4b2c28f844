//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Yahoo: quote, expiration and option chain client
//! - Discord: webhook notifier with message chunking
//! - Stdout: dry-run notifier
//! - Telemetry: tracing-backed event sink
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod discord;
pub mod stdout;
pub mod telemetry;
pub mod yahoo;

pub use cli::CliApp;
pub use discord::DiscordWebhookNotifier;
pub use stdout::StdoutNotifier;
pub use telemetry::TracingSink;
pub use yahoo::YahooClient;
