//! Discord webhook notifier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::format::{format_report, split_message};
use crate::config::{NotifierSection, WEBHOOK_PLACEHOLDER};
use crate::domain::{total_contracts, TickerResult};
use crate::ports::notifier::{NotifierPort, NotifyError};

/// Posts group reports to a Discord webhook as plain `content` messages
#[derive(Debug, Clone)]
pub struct DiscordWebhookNotifier {
    client: Client,
    max_retries: u32,
    chunk_size: usize,
}

impl DiscordWebhookNotifier {
    pub fn new(section: &NotifierSection) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(section.timeout())
            .build()
            .map_err(|e| NotifyError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: section.max_retries.max(1),
            chunk_size: section.chunk_size,
        })
    }

    /// Reject destinations that cannot be a webhook URL
    pub fn check_destination(destination: &str) -> Result<(), NotifyError> {
        let destination = destination.trim();
        if destination.is_empty() || destination == WEBHOOK_PLACEHOLDER {
            return Err(NotifyError::InvalidDestination(destination.to_string()));
        }
        if !(destination.starts_with("https://") || destination.starts_with("http://")) {
            return Err(NotifyError::InvalidDestination(destination.to_string()));
        }
        Ok(())
    }

    async fn post_chunk(
        &self,
        destination: &str,
        content: &str,
        part: usize,
        total: usize,
    ) -> Result<(), NotifyError> {
        let payload = serde_json::json!({ "content": content });
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            let response = match self.client.post(destination).json(&payload).send().await {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(NotifyError::Http(e.to_string()));
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let backoff = if status == StatusCode::TOO_MANY_REQUESTS {
                    Duration::from_secs(2u64.pow(attempt + 1))
                } else {
                    Duration::from_millis(500 * (attempt as u64 + 1))
                };
                tracing::warn!(
                    "Discord returned {} for message {}/{}, retrying in {:?}",
                    status,
                    part,
                    total,
                    backoff
                );
                last_error = Some(NotifyError::Rejected {
                    part,
                    total,
                    status: status.as_u16(),
                });
                tokio::time::sleep(backoff).await;
                continue;
            }

            return Err(NotifyError::Rejected {
                part,
                total,
                status: status.as_u16(),
            });
        }

        Err(last_error.unwrap_or_else(|| NotifyError::Http("Max retries exceeded".into())))
    }
}

#[async_trait]
impl NotifierPort for DiscordWebhookNotifier {
    async fn notify(
        &self,
        destination: &str,
        description: &str,
        results: &[TickerResult],
    ) -> Result<usize, NotifyError> {
        Self::check_destination(destination)?;

        tracing::info!(
            "Sending Discord notification for {}: {} contracts found",
            description,
            total_contracts(results)
        );

        let chunks = split_message(&format_report(description, results), self.chunk_size);
        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            tracing::debug!(
                "Sending message {}/{} ({} chars)",
                index + 1,
                total,
                chunk.chars().count()
            );
            self.post_chunk(destination.trim(), chunk, index + 1, total).await?;
        }

        tracing::info!("Delivered {} Discord message(s) for {}", total, description);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_destinations() {
        for destination in ["", "   ", WEBHOOK_PLACEHOLDER, "not-a-url"] {
            assert!(matches!(
                DiscordWebhookNotifier::check_destination(destination),
                Err(NotifyError::InvalidDestination(_))
            ));
        }
        assert!(DiscordWebhookNotifier::check_destination(
            "https://discord.com/api/webhooks/1/abc"
        )
        .is_ok());
    }

    #[tokio::test]
    async fn test_placeholder_is_rejected_before_sending() {
        let notifier = DiscordWebhookNotifier::new(&NotifierSection::default()).unwrap();
        let result = notifier.notify(WEBHOOK_PLACEHOLDER, "NASDAQ-100", &[]).await;
        assert!(matches!(result, Err(NotifyError::InvalidDestination(_))));
    }
}
