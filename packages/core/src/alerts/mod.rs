//! Notification delivery: the sink boundary and batch dispatch.

pub mod dispatch;
pub mod sink;

pub use dispatch::{deliver_all, DeliveryReport};
pub use sink::{DeliveryError, LogSink, MemorySink, NotificationSink, SentMessage};
