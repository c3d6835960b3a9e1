//! Prometheus metrics registry for the notifier.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the polling loops and the front end.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{Counter, Gauge, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Feed fetch attempts (alert ticks and digest runs).
    pub polls_total: Counter,
    /// Feed fetches that failed and degraded to an empty cycle.
    pub poll_errors_total: Counter,
    /// Events retained by the most recent normalization.
    pub events_retained: Gauge,
    /// Pre-event alerts handed to the sink successfully.
    pub alerts_sent_total: Counter,
    /// Digest message bodies handed to the sink successfully.
    pub digest_messages_sent_total: Counter,
    /// Messages the sink failed to deliver.
    pub delivery_failures_total: Counter,
    /// `/start` commands received.
    pub start_commands_total: Counter,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let polls_total = Counter::with_opts(Opts::new(
            "econ_notifier_polls_total",
            "Total calendar fetch attempts",
        ))?;

        let poll_errors_total = Counter::with_opts(Opts::new(
            "econ_notifier_poll_errors_total",
            "Failed calendar fetch attempts",
        ))?;

        let events_retained = Gauge::with_opts(Opts::new(
            "econ_notifier_events_retained",
            "Events retained by the latest normalization",
        ))?;

        let alerts_sent_total = Counter::with_opts(Opts::new(
            "econ_notifier_alerts_sent_total",
            "Pre-event alerts delivered",
        ))?;

        let digest_messages_sent_total = Counter::with_opts(Opts::new(
            "econ_notifier_digest_messages_sent_total",
            "Digest messages delivered",
        ))?;

        let delivery_failures_total = Counter::with_opts(Opts::new(
            "econ_notifier_delivery_failures_total",
            "Messages that failed to deliver",
        ))?;

        let start_commands_total = Counter::with_opts(Opts::new(
            "econ_notifier_start_commands_total",
            "Start commands received",
        ))?;

        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_errors_total.clone()))?;
        registry.register(Box::new(events_retained.clone()))?;
        registry.register(Box::new(alerts_sent_total.clone()))?;
        registry.register(Box::new(digest_messages_sent_total.clone()))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;
        registry.register(Box::new(start_commands_total.clone()))?;

        Ok(Self {
            polls_total,
            poll_errors_total,
            events_retained,
            alerts_sent_total,
            digest_messages_sent_total,
            delivery_failures_total,
            start_commands_total,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_without_error() {
        let metrics = AppMetrics::new();
        assert!(metrics.is_ok(), "AppMetrics::new() failed: {:?}", metrics.err());
    }

    #[test]
    fn render_contains_incremented_counter() {
        let metrics = AppMetrics::new().unwrap();
        metrics.alerts_sent_total.inc_by(2.0);
        let output = metrics.render().unwrap();
        assert!(output.contains("econ_notifier_alerts_sent_total 2"));
    }

    #[test]
    fn gauge_tracks_latest_value() {
        let metrics = AppMetrics::new().unwrap();
        metrics.events_retained.set(12.0);
        metrics.events_retained.set(4.0);
        assert!((metrics.events_retained.get() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn independent_instances_do_not_share_counts() {
        let a = AppMetrics::new().unwrap();
        let b = AppMetrics::new().unwrap();
        a.polls_total.inc();
        assert!((b.polls_total.get()).abs() < f64::EPSILON);
    }
}
