//! Economic Calendar Module
//!
//! Ingestion and scheduling core: normalizes a raw event feed, decides which
//! events are due for a pre-event alert and partitions the day's events into
//! a bounded digest.

pub mod alert_scheduler;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod format;
pub mod normalizer;
pub mod provider;
pub mod types;

#[cfg(test)]
mod tests;

pub use alert_scheduler::AlertScheduler;
pub use config::{AlertConfig, DigestConfig};
pub use digest::{Digest, DigestBuilder};
pub use engine::CalendarEngine;
pub use error::{FetchError, RowError, TimeParseError};
pub use normalizer::EventNormalizer;
pub use provider::{EventFeed, RowExtractor};
pub use types::*;
