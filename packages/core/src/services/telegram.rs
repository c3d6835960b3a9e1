//! Telegram Bot API client.
//!
//! Used as the notification sink (`sendMessage`) and by the front end to
//! receive commands, either by long polling (`getUpdates`) or by
//! registering a webhook (`setWebhook`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::alerts::sink::{DeliveryError, NotificationSink};
use crate::error::AppError;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Errors from Bot API calls.
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {description}")]
    Api { description: String },

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Incoming update, reduced to the fields the bot reacts to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Clone)]
pub struct TelegramClient {
    api_base: String,
    token: String,
    http: Client,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self, AppError> {
        Self::with_api_base(TELEGRAM_API_BASE.to_string(), token, timeout)
    }

    /// Client against a different API host (local Bot API server, tests).
    pub fn with_api_base(api_base: String, token: String, timeout: Duration) -> Result<Self, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::Config("Telegram bot token must not be empty".into()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        let mut request = self.http.post(self.method_url(method)).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await?;

        if parsed.ok {
            if let Some(result) = parsed.result {
                return Ok(result);
            }
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = parsed
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(30);
            return Err(TelegramError::RateLimited { retry_after_secs });
        }

        Err(TelegramError::Api {
            description: parsed
                .description
                .unwrap_or_else(|| format!("{} failed with HTTP {}", method, status)),
        })
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        tracing::debug!(chat_id, "Sending Telegram message");
        self.call::<serde_json::Value>(
            "sendMessage",
            serde_json::json!({ "chat_id": chat_id, "text": text }),
            None,
        )
        .await
        .map(|_| ())
    }

    /// Long-poll for updates after `offset`. The request timeout is
    /// extended past the long-poll wait.
    pub async fn get_updates(&self, offset: i64, wait_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            serde_json::json!({
                "offset": offset,
                "timeout": wait_secs,
                "allowed_updates": ["message"],
            }),
            Some(Duration::from_secs(wait_secs + 10)),
        )
        .await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        self.call::<bool>("setWebhook", serde_json::json!({ "url": url }), None)
            .await
            .map(|_| ())
    }

    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        self.call::<bool>("deleteWebhook", serde_json::json!({}), None)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl NotificationSink for TelegramClient {
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        self.send_message(destination, text).await.map_err(|err| match err {
            TelegramError::RateLimited { retry_after_secs } => DeliveryError::RateLimited {
                destination: destination.to_string(),
                retry_after_secs,
            },
            other => DeliveryError::failed(destination, other.to_string()),
        })
    }

    fn sink_name(&self) -> &str {
        "telegram"
    }
}
