//! Time sources and wall-clock resolution

use std::sync::Mutex;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::calendar::error::TimeParseError;

/// Injectable source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests and dry runs.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = *guard + by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Parse a published time of day. Accepts `15:30` and `03:30 PM`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, TimeParseError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&trimmed.to_uppercase(), "%I:%M %p"))
        .map_err(|_| TimeParseError::Unrecognised {
            value: value.to_string(),
        })
}

/// Place a published time of day on `date` in `tz`.
///
/// An ambiguous local time (DST fall-back) resolves to its earlier instant;
/// a time skipped by a DST gap is an error.
pub fn resolve_on(value: &str, date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, TimeParseError> {
    let time = parse_time_of_day(value)?;
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(at) => Ok(at),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(TimeParseError::NonExistent {
            value: value.to_string(),
            date,
            zone: tz.name().to_string(),
        }),
    }
}
