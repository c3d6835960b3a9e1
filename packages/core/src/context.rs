//! Shared application state handed to the loops and the front end.

use std::sync::Arc;

use crate::alerts::NotificationSink;
use crate::calendar::CalendarEngine;
use crate::metrics::AppMetrics;

pub struct AppContext {
    pub engine: Arc<CalendarEngine>,
    pub sink: Arc<dyn NotificationSink>,
    pub metrics: Arc<AppMetrics>,
    /// Destination of scheduled alerts and the daily digest.
    pub channel_id: String,
}
