//! Calendar Engine - orchestrates feed, normalizer, alert scheduler and digest

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::calendar::{
    alert_scheduler::AlertScheduler,
    clock::{Clock, SystemClock},
    config::{AlertConfig, DigestConfig},
    digest::{Digest, DigestBuilder},
    normalizer::EventNormalizer,
    provider::EventFeed,
    types::{Event, NormalizeStats},
};

/// Events loaded by one fetch + normalize pass.
#[derive(Debug, Clone, Default)]
pub struct LoadedEvents {
    pub events: Vec<Event>,
    pub stats: NormalizeStats,
    /// `false` when the feed failed and the cycle degraded to no events.
    pub fetched: bool,
}

/// Central engine shared by the alert loop, the digest loop and the front end.
///
/// The alert scheduler sits behind its own lock, held only while checking,
/// so overlapping ticks serialize without holding the lock across I/O.
pub struct CalendarEngine {
    feed: Arc<dyn EventFeed + Send + Sync>,
    normalizer: EventNormalizer,
    alerts: Mutex<AlertScheduler>,
    digest: DigestBuilder,
    clock: Arc<dyn Clock>,
    lead_time: chrono::Duration,
}

impl CalendarEngine {
    pub fn new(
        feed: Arc<dyn EventFeed + Send + Sync>,
        normalizer: EventNormalizer,
        alert_config: AlertConfig,
        digest_config: DigestConfig,
    ) -> Self {
        Self::with_clock(feed, normalizer, alert_config, digest_config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        feed: Arc<dyn EventFeed + Send + Sync>,
        normalizer: EventNormalizer,
        alert_config: AlertConfig,
        digest_config: DigestConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            feed,
            normalizer,
            lead_time: alert_config.lead_time,
            alerts: Mutex::new(AlertScheduler::with_clock(alert_config, clock.clone())),
            digest: DigestBuilder::new(digest_config),
            clock,
        }
    }

    /// Fetch and normalize the current listing.
    ///
    /// A feed failure is logged and yields an empty listing.
    pub async fn load_events(&self) -> LoadedEvents {
        tracing::info!("Fetching events from {}", self.feed.feed_name());
        let rows = match self.feed.fetch().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("Feed error, treating cycle as empty: {}", err);
                return LoadedEvents::default();
            }
        };

        let output = self.normalizer.normalize(&rows);
        LoadedEvents {
            events: output.events,
            stats: output.stats,
            fetched: true,
        }
    }

    /// Events whose alert is due now; each is recorded as alerted.
    pub async fn due_alerts(&self, events: &[Event]) -> Vec<Event> {
        let now = self.clock.now();
        let mut scheduler = self.alerts.lock().await;
        scheduler.check(events, now)
    }

    /// Digest of `events` for the current local date.
    pub fn todays_digest(&self, events: &[Event]) -> Option<Digest> {
        self.digest.build_at(events, self.clock.now())
    }

    pub async fn alerted_count(&self) -> usize {
        self.alerts.lock().await.alerted_count()
    }

    /// Alert lead time in whole minutes, for message text.
    pub fn lead_minutes(&self) -> i64 {
        self.lead_time.num_minutes()
    }

    pub fn digest_config(&self) -> &DigestConfig {
        self.digest.config()
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
