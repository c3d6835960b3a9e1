//! Configuration for the alert scheduler and digest builder

use chrono::Duration;
use chrono_tz::Tz;

/// Default local zone of the calendar.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Riyadh;

/// Configuration for pre-event alerts
#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub timezone: Tz,
    /// How long before an event the alert fires.
    pub lead_time: Duration,
    /// Half-width of the catch window around `lead_time`.
    pub tolerance: Duration,
}

/// Configuration for the daily digest
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub timezone: Tz,
    pub max_messages: usize,
    /// Shown in the digest header, e.g. "United States".
    pub region_label: String,
}

impl AlertConfig {
    /// Inclusive `(earliest, latest)` time-until-event that counts as due.
    pub fn due_window(&self) -> (Duration, Duration) {
        (self.lead_time - self.tolerance, self.lead_time + self.tolerance)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            lead_time: Duration::minutes(15),
            tolerance: Duration::minutes(1),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            max_messages: 3,
            region_label: "United States".to_string(),
        }
    }
}
