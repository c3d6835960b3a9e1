//! Notification sink trait and in-process sinks.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a notification channel. Never fatal to the engine.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Delivery to {destination} failed: {reason}")]
    Failed { destination: String, reason: String },

    #[error("Delivery to {destination} rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        destination: String,
        retry_after_secs: u64,
    },
}

impl DeliveryError {
    pub fn failed(destination: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            destination: destination.into(),
            reason: reason.into(),
        }
    }
}

/// Delivers a composed message to a destination channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError>;

    /// Human-readable name for this sink (e.g. "telegram").
    fn sink_name(&self) -> &str;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        tracing::info!(destination, "[dry-run] message:\n{}", text);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}

/// A message captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: String,
    pub text: String,
}

/// Records messages in memory; optionally fails messages containing a
/// marker string.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<SentMessage>>,
    attempts: Mutex<usize>,
    fail_when_contains: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every message whose text contains `marker`.
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            fail_when_contains: Some(marker.into()),
            ..Self::default()
        }
    }

    /// Messages delivered so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Delivery attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.lock().map(|a| *a).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            *attempts += 1;
        }

        if let Some(marker) = &self.fail_when_contains {
            if text.contains(marker.as_str()) {
                return Err(DeliveryError::failed(destination, "rejected by test sink"));
            }
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                destination: destination.to_string(),
                text: text.to_string(),
            });
        }
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.send("42", "first").await.unwrap();
        sink.send("42", "second").await.unwrap();

        let texts: Vec<_> = sink.sent().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn failing_sink_counts_attempts_but_records_nothing() {
        let sink = MemorySink::failing_on("boom");
        let result = sink.send("42", "boom").await;

        assert!(matches!(result, Err(DeliveryError::Failed { .. })));
        assert_eq!(sink.attempts(), 1);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn log_sink_always_succeeds() {
        assert!(LogSink.send("42", "hello").await.is_ok());
    }
}
