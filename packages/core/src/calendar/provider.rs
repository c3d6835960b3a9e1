//! Event Feed Interface
//!
//! Abstraction layer over calendar sources. A feed yields raw rows; the
//! provider-specific markup knowledge lives in a [`RowExtractor`], so a new
//! provider never touches the scheduler or the digest builder.

use async_trait::async_trait;

use crate::calendar::{error::FetchError, types::RawRow};

/// Trait for calendar feeds to keep the pipeline source independent
#[async_trait]
pub trait EventFeed {
    /// Fetch the current event listing
    async fn fetch(&self) -> Result<Vec<RawRow>, FetchError>;

    /// Name of this feed for logging/debugging
    fn feed_name(&self) -> &str;
}

/// Turns a provider's page body into raw rows.
pub trait RowExtractor: Send + Sync {
    fn extract(&self, body: &str) -> Vec<RawRow>;
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FetchError>;
