//! Batch delivery.
//!
//! Sends each message body independently: one failed delivery is logged and
//! the remaining bodies in the batch are still attempted.

use crate::alerts::sink::NotificationSink;

/// Outcome of delivering one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Deliver `bodies` to `destination` in order.
pub async fn deliver_all<'a, I>(
    sink: &dyn NotificationSink,
    destination: &str,
    bodies: I,
) -> DeliveryReport
where
    I: IntoIterator<Item = &'a str>,
{
    let bodies: Vec<&str> = bodies.into_iter().collect();
    let total = bodies.len();
    let mut report = DeliveryReport::default();

    for (i, body) in bodies.into_iter().enumerate() {
        report.attempted += 1;
        match sink.send(destination, body).await {
            Ok(()) => {
                report.delivered += 1;
                tracing::info!(
                    "Delivered message {}/{} to {} via {}",
                    i + 1,
                    total,
                    destination,
                    sink.sink_name()
                );
            }
            Err(err) => {
                report.failed += 1;
                tracing::error!("Message {}/{} not delivered: {}", i + 1, total, err);
            }
        }
    }

    report
}
