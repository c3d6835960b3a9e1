use std::env;
use std::fmt;
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::calendar::config::{AlertConfig, DigestConfig, DEFAULT_TIMEZONE};
use crate::cli::Cli;
use crate::services::investing::DEFAULT_FEED_URL;

#[derive(Clone)]
pub struct Config {
    pub telegram_token: Option<String>,
    pub channel_id: Option<String>,
    pub timezone: Tz,
    pub transport: Transport,
    pub port: u16,
    pub webhook_url: Option<String>,
    pub feed_url: String,
    pub target_region: String,
    pub poll_interval_seconds: u64,
    pub digest_time: NaiveTime,
    pub max_digest_messages: usize,
    pub fetch_timeout_seconds: u64,
}

/// How the front end receives bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Webhook,
    Polling,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timezone = match var("TIMEZONE") {
            Some(raw) => parse_timezone(&raw)?,
            None => DEFAULT_TIMEZONE,
        };

        let transport = match var("TRANSPORT") {
            Some(raw) => parse_transport(&raw)?,
            None => Transport::Polling,
        };

        let port = parse_number(var("PORT"), "PORT", 5000u16)?;
        let poll_interval_seconds = parse_number(var("POLL_INTERVAL_SECONDS"), "POLL_INTERVAL_SECONDS", 60u64)?;
        let max_digest_messages = parse_number(var("MAX_DIGEST_MESSAGES"), "MAX_DIGEST_MESSAGES", 3usize)?;
        let fetch_timeout_seconds = parse_number(var("FETCH_TIMEOUT_SECONDS"), "FETCH_TIMEOUT_SECONDS", 20u64)?;

        let digest_time = match var("DIGEST_TIME") {
            Some(raw) => parse_digest_time(&raw)?,
            None => NaiveTime::MIN,
        };

        Ok(Self {
            telegram_token: var("TELEGRAM_TOKEN"),
            channel_id: var("CHANNEL_ID"),
            timezone,
            transport,
            port,
            webhook_url: var("WEBHOOK_URL"),
            feed_url: var("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            target_region: var("TARGET_REGION").unwrap_or_else(|| "United States".to_string()),
            poll_interval_seconds,
            digest_time,
            max_digest_messages,
            fetch_timeout_seconds,
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), String> {
        if let Some(raw) = &cli.timezone {
            self.timezone = parse_timezone(raw)?;
        }
        if let Some(raw) = &cli.transport {
            self.transport = parse_transport(raw)?;
        }
        if let Some(seconds) = cli.poll_interval {
            self.poll_interval_seconds = seconds;
        }
        if let Some(raw) = &cli.digest_time {
            self.digest_time = parse_digest_time(raw)?;
        }
        if let Some(region) = &cli.region {
            self.target_region = region.clone();
        }
        Ok(())
    }

    /// Check cross-field requirements. Delivery settings are only needed
    /// when messages actually go to Telegram.
    pub fn validate(&self, dry_run: bool) -> Result<(), String> {
        if !dry_run {
            if self.telegram_token.is_none() {
                return Err("TELEGRAM_TOKEN is required".into());
            }
            if self.channel_id.is_none() {
                return Err("CHANNEL_ID is required".into());
            }
        }
        if self.poll_interval_seconds == 0 {
            return Err("POLL_INTERVAL_SECONDS must be greater than zero".into());
        }
        if self.max_digest_messages == 0 {
            return Err("MAX_DIGEST_MESSAGES must be at least 1".into());
        }
        if self.fetch_timeout_seconds == 0 {
            return Err("FETCH_TIMEOUT_SECONDS must be greater than zero".into());
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            timezone: self.timezone,
            ..AlertConfig::default()
        }
    }

    pub fn digest_config(&self) -> DigestConfig {
        DigestConfig {
            timezone: self.timezone,
            max_messages: self.max_digest_messages,
            region_label: self.target_region.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "<redacted>"))
            .field("channel_id", &self.channel_id)
            .field("timezone", &self.timezone.name())
            .field("transport", &self.transport)
            .field("port", &self.port)
            .field("webhook_url", &self.webhook_url)
            .field("feed_url", &self.feed_url)
            .field("target_region", &self.target_region)
            .field("poll_interval_seconds", &self.poll_interval_seconds)
            .field("digest_time", &self.digest_time)
            .field("max_digest_messages", &self.max_digest_messages)
            .field("fetch_timeout_seconds", &self.fetch_timeout_seconds)
            .finish()
    }
}

fn parse_timezone(raw: &str) -> Result<Tz, String> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| format!("Invalid TIMEZONE: {}", raw))
}

fn parse_transport(raw: &str) -> Result<Transport, String> {
    match raw.trim().to_lowercase().as_str() {
        "webhook" => Ok(Transport::Webhook),
        "polling" => Ok(Transport::Polling),
        other => Err(format!("Invalid TRANSPORT: {}", other)),
    }
}

fn parse_digest_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| format!("DIGEST_TIME must be HH:MM, got {}", raw))
}

fn parse_number<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, String> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
