//! Core data types for calendar events

use std::fmt;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Placeholder used when a feed row is missing its time or title cell.
pub const UNSPECIFIED: &str = "unspecified";

/// A single row as extracted from a provider's listing, before filtering.
///
/// Every field is optional because provider markup is not reliable: a row
/// may be missing any of its cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub region: Option<String>,
    pub time: Option<String>,
    pub title: Option<String>,
    pub impact: Option<String>,
}

impl RawRow {
    /// `true` when the row carries no cell at all.
    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.time.is_none() && self.title.is_none() && self.impact.is_none()
    }
}

/// Expected market significance of an event.
///
/// Only the two tiers worth notifying about are representable; rows of any
/// lower tier never become an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    Moderate,
    Strong,
}

impl Impact {
    /// Marker shown next to the impact label in messages.
    pub fn marker(&self) -> &'static str {
        match self {
            Impact::Moderate => "🟡",
            Impact::Strong => "🔴",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Impact::Moderate => write!(f, "Moderate {}", self.marker()),
            Impact::Strong => write!(f, "Strong {}", self.marker()),
        }
    }
}

/// A normalized calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Wall-clock time exactly as published, no date attached.
    pub time_of_day: String,
    pub title: String,
    pub impact: Impact,
}

impl Event {
    pub fn new(time_of_day: impl Into<String>, title: impl Into<String>, impact: Impact) -> Self {
        Self {
            time_of_day: time_of_day.into(),
            title: title.into(),
            impact,
        }
    }

    /// Structural identity of the event across independent polls.
    pub fn key(&self) -> EventKey {
        EventKey {
            time_of_day: self.time_of_day.clone(),
            title: self.title.clone(),
        }
    }
}

/// `(time_of_day, title)` pair identifying "the same event" across polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub time_of_day: String,
    pub title: String,
}

/// An [`EventKey`] pinned to the local date it was alerted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertKey {
    pub date: NaiveDate,
    pub event: EventKey,
}

/// An event resolved against a concrete local date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub event: Event,
    pub at: DateTime<Tz>,
}

/// Per-poll statistics produced by the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub total: usize,
    pub in_region: usize,
    pub retained: usize,
    pub rejected: usize,
}

/// Output of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutput {
    pub events: Vec<Event>,
    pub stats: NormalizeStats,
}
