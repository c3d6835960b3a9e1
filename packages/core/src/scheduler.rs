//! Alert polling and daily digest loops.
//!
//! Two independent timelines run as separate tasks: a fixed-period alert
//! tick and a once-a-day digest. Each iteration fetches the calendar,
//! normalizes it and hands the resulting messages to the sink. Failures are
//! logged and the loop continues; a single bad cycle never stops either
//! timeline.

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::alerts::{deliver_all, DeliveryReport};
use crate::calendar::format;
use crate::context::AppContext;

/// Run the alert polling loop until `shutdown` fires.
///
/// Ticks that fall behind (slow fetch) are skipped rather than bunched, so
/// ticks never overlap. A shutdown during a tick abandons it.
pub async fn run_alert_polling(
    ctx: std::sync::Arc<AppContext>,
    poll_interval_seconds: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = time::interval(Duration::from_secs(poll_interval_seconds));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("Alert polling started (interval: {}s)", poll_interval_seconds);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => break,
        }

        tokio::select! {
            _ = alert_once(&ctx) => {}
            _ = shutdown.changed() => {
                tracing::info!("Shutdown during alert tick; abandoning it");
                break;
            }
        }
    }

    tracing::info!("Alert polling stopped cleanly");
}

/// Execute a single alert tick.
pub async fn alert_once(ctx: &AppContext) -> DeliveryReport {
    ctx.metrics.polls_total.inc();

    let loaded = ctx.engine.load_events().await;
    if !loaded.fetched {
        ctx.metrics.poll_errors_total.inc();
        return DeliveryReport::default();
    }
    ctx.metrics.events_retained.set(loaded.events.len() as f64);

    tracing::info!("Checking {} events for alerts", loaded.events.len());
    let due = ctx.engine.due_alerts(&loaded.events).await;
    if due.is_empty() {
        return DeliveryReport::default();
    }

    let lead = ctx.engine.lead_minutes();
    let bodies: Vec<String> = due
        .iter()
        .map(|event| format::alert_message(event, lead))
        .collect();

    let report = deliver_all(
        ctx.sink.as_ref(),
        &ctx.channel_id,
        bodies.iter().map(String::as_str),
    )
    .await;

    ctx.metrics.alerts_sent_total.inc_by(report.delivered as f64);
    ctx.metrics.delivery_failures_total.inc_by(report.failed as f64);
    report
}

/// Run the daily digest loop until `shutdown` fires.
pub async fn run_daily_digest(
    ctx: std::sync::Arc<AppContext>,
    digest_time: NaiveTime,
    mut shutdown: watch::Receiver<bool>,
) {
    let tz = ctx.engine.digest_config().timezone;
    tracing::info!("Daily digest scheduled for {} {}", digest_time.format("%H:%M"), tz.name());

    loop {
        let now = ctx.engine.now();
        let next = next_digest_at(now, tz, digest_time);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!("Next digest at {}", next.with_timezone(&tz));

        tokio::select! {
            _ = time::sleep(wait) => {}
            _ = shutdown.changed() => break,
        }

        tokio::select! {
            _ = digest_once(&ctx, &ctx.channel_id) => {}
            _ = shutdown.changed() => {
                tracing::info!("Shutdown during digest run; abandoning it");
                break;
            }
        }
    }

    tracing::info!("Daily digest stopped cleanly");
}

/// Build today's digest and send it to `destination`.
///
/// Returns `None` when there is nothing to send.
pub async fn digest_once(ctx: &AppContext, destination: &str) -> Option<DeliveryReport> {
    tracing::info!("Preparing daily digest for {}", destination);
    ctx.metrics.polls_total.inc();

    let loaded = ctx.engine.load_events().await;
    if loaded.fetched {
        ctx.metrics.events_retained.set(loaded.events.len() as f64);
    } else {
        ctx.metrics.poll_errors_total.inc();
    }

    let digest = match ctx.engine.todays_digest(&loaded.events) {
        Some(digest) => digest,
        None => {
            tracing::info!("No events for today's digest; nothing to send");
            return None;
        }
    };

    let report = deliver_all(ctx.sink.as_ref(), destination, digest.bodies()).await;

    ctx.metrics.digest_messages_sent_total.inc_by(report.delivered as f64);
    ctx.metrics.delivery_failures_total.inc_by(report.failed as f64);
    Some(report)
}

/// Next instant strictly after `now` at which the local clock in `tz`
/// shows `at`. A local time skipped by a DST gap moves forward an hour.
pub fn next_digest_at(now: DateTime<Utc>, tz: Tz, at: NaiveTime) -> DateTime<Utc> {
    let mut date = now.with_timezone(&tz).date_naive();

    for _ in 0..3 {
        let local = date.and_time(at);
        let candidate = tz
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(local + ChronoDuration::hours(1))).earliest());

        if let Some(candidate) = candidate {
            let candidate = candidate.with_timezone(&Utc);
            if candidate > now {
                return candidate;
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    now + ChronoDuration::days(1)
}
