//! Digest Builder
//!
//! Orders a day's events chronologically and partitions them into at most
//! `max_messages` contiguous message bodies.

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::{
    clock::resolve_on,
    config::DigestConfig,
    format,
    types::{Event, ScheduledEvent},
};

/// One message of a digest and the events it covers.
#[derive(Debug, Clone)]
pub struct DigestMessage {
    pub events: Vec<ScheduledEvent>,
    pub body: String,
}

/// A non-empty, chronologically ordered digest.
#[derive(Debug, Clone)]
pub struct Digest {
    pub date: NaiveDate,
    pub messages: Vec<DigestMessage>,
}

impl Digest {
    pub fn bodies(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.body.as_str())
    }

    pub fn event_count(&self) -> usize {
        self.messages.iter().map(|m| m.events.len()).sum()
    }
}

pub struct DigestBuilder {
    config: DigestConfig,
}

impl DigestBuilder {
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Build the digest for the local date containing `now`.
    pub fn build_at(&self, events: &[Event], now: DateTime<Utc>) -> Option<Digest> {
        let today = now.with_timezone(&self.config.timezone).date_naive();
        self.build(events, today)
    }

    /// Build the digest for `date`.
    ///
    /// Returns `None` when no event can be placed on the calendar, so the
    /// caller never sends an empty body.
    pub fn build(&self, events: &[Event], date: NaiveDate) -> Option<Digest> {
        let mut scheduled: Vec<ScheduledEvent> = events
            .iter()
            .filter_map(|event| match resolve_on(&event.time_of_day, date, self.config.timezone) {
                Ok(at) => Some(ScheduledEvent {
                    event: event.clone(),
                    at,
                }),
                Err(err) => {
                    tracing::warn!("Excluding '{}' from digest: {}", event.title, err);
                    None
                }
            })
            .collect();

        if scheduled.is_empty() {
            tracing::info!("No events to include in the digest for {}", date);
            return None;
        }

        // stable: events at the same instant keep feed order
        scheduled.sort_by(|a, b| a.at.cmp(&b.at));

        let max_messages = self.config.max_messages.max(1);
        let chunk_size = scheduled.len().div_ceil(max_messages);
        let chunks: Vec<Vec<ScheduledEvent>> = scheduled
            .chunks(chunk_size)
            .take(max_messages)
            .map(<[ScheduledEvent]>::to_vec)
            .collect();

        let parts = chunks.len();
        let messages = chunks
            .into_iter()
            .enumerate()
            .map(|(i, events)| {
                let body = format::digest_message(
                    &self.config.region_label,
                    i + 1,
                    parts,
                    events.iter().map(|s| &s.event),
                );
                DigestMessage { events, body }
            })
            .collect();

        tracing::info!("Prepared digest of {} events in {} messages", scheduled.len(), parts);

        Some(Digest { date, messages })
    }
}
