//! In-memory event feed for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::calendar::{
    error::FetchError,
    provider::{EventFeed, FeedResult},
    types::RawRow,
};

/// Serves a fixed set of rows, or a fixed HTTP failure.
#[derive(Debug, Default)]
pub struct MockFeed {
    rows: Mutex<Vec<RawRow>>,
    failure: Option<u16>,
    fetches: AtomicUsize,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: Vec<RawRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..self
        }
    }

    /// Every fetch fails with `BadStatus(status)`.
    pub fn with_bad_status(self, status: u16) -> Self {
        Self {
            failure: Some(status),
            ..self
        }
    }

    pub fn set_rows(&self, rows: Vec<RawRow>) {
        if let Ok(mut guard) = self.rows.lock() {
            *guard = rows;
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventFeed for MockFeed {
    async fn fetch(&self) -> FeedResult<Vec<RawRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.failure {
            return Err(FetchError::BadStatus { code });
        }
        Ok(self.rows.lock().map(|rows| rows.clone()).unwrap_or_default())
    }

    fn feed_name(&self) -> &str {
        "mock"
    }
}

/// A row for the given region with every cell present.
pub fn raw_row(region: &str, time: &str, title: &str, impact: &str) -> RawRow {
    RawRow {
        region: Some(region.to_string()),
        time: Some(time.to_string()),
        title: Some(title.to_string()),
        impact: Some(impact.to_string()),
    }
}
