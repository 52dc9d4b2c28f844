//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/default.toml. Rule violations are fatal at startup.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::strategy::params::{ParamsError, RuleConfig};

/// Placeholder the sample config ships with instead of a real webhook
pub const WEBHOOK_PLACEHOLDER: &str = "URL_POR_DEFECTO";

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub screen: ScreenSection,
    #[serde(default)]
    pub market_data: MarketDataSection,
    #[serde(default)]
    pub notifier: NotifierSection,
    #[serde(default)]
    pub logging: LoggingSection,
    pub groups: Vec<GroupSection>,
}

/// Batch execution settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenSection {
    /// Tickers analyzed concurrently within a group
    #[serde(default = "default_max_concurrent_tickers")]
    pub max_concurrent_tickers: usize,
}

impl Default for ScreenSection {
    fn default() -> Self {
        Self {
            max_concurrent_tickers: default_max_concurrent_tickers(),
        }
    }
}

fn default_max_concurrent_tickers() -> usize {
    4
}

/// Yahoo Finance client settings
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSection {
    /// Base URL of the v7 finance API
    #[serde(default = "default_market_data_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fill in put/call delta from Black-Scholes when the feed omits it
    #[serde(default)]
    pub estimate_missing_delta: bool,
    /// Annual risk-free rate used for delta estimation
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

impl Default for MarketDataSection {
    fn default() -> Self {
        Self {
            api_url: default_market_data_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            estimate_missing_delta: false,
            risk_free_rate: default_risk_free_rate(),
        }
    }
}

impl MarketDataSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_market_data_url() -> String {
    "https://query1.finance.yahoo.com/v7/finance".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_risk_free_rate() -> f64 {
    0.04
}

/// Discord webhook settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierSection {
    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Maximum characters per message
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for NotifierSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_notifier_timeout_secs(),
            max_retries: default_max_retries(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl NotifierSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_notifier_timeout_secs() -> u64 {
    15
}

fn default_chunk_size() -> usize {
    1900
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One ticker group: a universe, where to report it, and its rules
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSection {
    pub name: String,
    pub description: String,
    pub tickers: Vec<String>,
    /// Webhook URL written in the file (prefer `webhook_env`)
    #[serde(default)]
    pub webhook: Option<String>,
    /// Environment variable holding the webhook URL
    #[serde(default)]
    pub webhook_env: Option<String>,
    pub rules: RuleConfig,
}

impl GroupSection {
    /// Get webhook URL with environment variable override
    /// Checks `webhook_env` first, falls back to `webhook`
    pub fn webhook_url(&self) -> Option<String> {
        if let Some(ref var) = self.webhook_env {
            if let Ok(url) = std::env::var(var) {
                if !url.trim().is_empty() {
                    return Some(url);
                }
            }
        }
        self.webhook
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .cloned()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid rules for group '{group}': {source}")]
    InvalidRules {
        group: String,
        #[source]
        source: ParamsError,
    },
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.max_concurrent_tickers == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_tickers must be > 0".to_string(),
            ));
        }

        if self.market_data.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "market_data.api_url cannot be empty".to_string(),
            ));
        }

        if self.market_data.max_retries == 0 || self.notifier.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be > 0".to_string(),
            ));
        }

        if !self.market_data.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "risk_free_rate must be finite, got {}",
                self.market_data.risk_free_rate
            )));
        }

        // Discord rejects messages over 2000 characters
        if self.notifier.chunk_size == 0 || self.notifier.chunk_size > 2000 {
            return Err(ConfigError::ValidationError(format!(
                "chunk_size must be 1-2000, got {}",
                self.notifier.chunk_size
            )));
        }

        if self.groups.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[groups]] entry is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "group name cannot be empty".to_string(),
                ));
            }
            if !names.insert(group.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate group name '{}'",
                    group.name
                )));
            }
            if group.tickers.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "group '{}' has no tickers",
                    group.name
                )));
            }
            if let Some(ticker) = group.tickers.iter().find(|t| t.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "group '{}' has an empty ticker {:?}",
                    group.name, ticker
                )));
            }
            group.rules.validate().map_err(|source| ConfigError::InvalidRules {
                group: group.name.clone(),
                source,
            })?;
        }

        Ok(())
    }

    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&GroupSection> {
        self.groups.iter().find(|g| g.name == name)
    }
}
