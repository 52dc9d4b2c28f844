//! Discord Adapter
//!
//! Formats group reports and delivers them through a webhook.

mod format;
mod webhook;

pub use format::{format_contract_line, format_report, split_message, DISCORD_MESSAGE_LIMIT};
pub use webhook::DiscordWebhookNotifier;
