//! Alert Scheduler
//!
//! Decides, on each polling tick, which events are due for their pre-event
//! alert. Already-alerted events are remembered per local date so the same
//! event is never alerted twice in a day, while a recurring event at the
//! same clock time is alerted again the next day.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::{
    clock::{resolve_on, Clock, SystemClock},
    config::AlertConfig,
    types::{AlertKey, Event},
};

pub struct AlertScheduler {
    config: AlertConfig,
    clock: Arc<dyn Clock>,
    alerted: HashSet<AlertKey>,
}

impl AlertScheduler {
    pub fn new(config: AlertConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AlertConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            alerted: HashSet::new(),
        }
    }

    /// [`check`](Self::check) against the scheduler's own clock.
    pub fn tick(&mut self, events: &[Event]) -> Vec<Event> {
        let now = self.clock.now();
        self.check(events, now)
    }

    /// Return the events whose alert is due at `now`.
    ///
    /// Every returned event is recorded as alerted before this returns, so
    /// a failed delivery is not retried on the next tick.
    pub fn check(&mut self, events: &[Event], now: DateTime<Utc>) -> Vec<Event> {
        let tz = self.config.timezone;
        let today = now.with_timezone(&tz).date_naive();
        self.prune_before(today);

        let (earliest, latest) = self.config.due_window();
        let mut due = Vec::new();

        for event in events {
            let at = match resolve_on(&event.time_of_day, today, tz) {
                Ok(at) => at,
                Err(err) => {
                    tracing::warn!("Skipping alert check for '{}': {}", event.title, err);
                    continue;
                }
            };

            let until = at.with_timezone(&Utc) - now;
            if until < earliest || until > latest {
                continue;
            }

            let key = AlertKey {
                date: today,
                event: event.key(),
            };
            if !self.alerted.insert(key) {
                tracing::debug!("Already alerted today: {}", event.title);
                continue;
            }

            tracing::info!(
                "Alert due for '{}' ({:.1} minutes ahead)",
                event.title,
                until.num_seconds() as f64 / 60.0
            );
            due.push(event.clone());
        }

        due
    }

    /// Number of alerts recorded for the current day.
    pub fn alerted_count(&self) -> usize {
        self.alerted.len()
    }

    fn prune_before(&mut self, today: NaiveDate) {
        let before = self.alerted.len();
        self.alerted.retain(|key| key.date >= today);
        let pruned = before - self.alerted.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} alert records from previous days", pruned);
        }
    }
}
