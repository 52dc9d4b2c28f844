//! Stdout notifier for dry runs
//!
//! Prints exactly the chunks the Discord adapter would post, one block per
//! message, without touching the network. The destination is never printed.

use std::io::Write;

use async_trait::async_trait;

use super::discord::{format_report, split_message};
use crate::domain::TickerResult;
use crate::ports::notifier::{NotifierPort, NotifyError};

#[derive(Debug, Clone)]
pub struct StdoutNotifier {
    chunk_size: usize,
}

impl StdoutNotifier {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub fn render(&self, description: &str, results: &[TickerResult]) -> Vec<String> {
        split_message(&format_report(description, results), self.chunk_size)
    }
}

#[async_trait]
impl NotifierPort for StdoutNotifier {
    async fn notify(
        &self,
        _destination: &str,
        description: &str,
        results: &[TickerResult],
    ) -> Result<usize, NotifyError> {
        let chunks = self.render(description, results);
        let total = chunks.len();

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for (index, chunk) in chunks.iter().enumerate() {
            writeln!(out, "--- {} ({}/{}) ---", description, index + 1, total)?;
            writeln!(out, "{}", chunk.trim_end())?;
        }
        out.flush()?;

        Ok(total)
    }
}
