//! Holiday alert delivery.
//!
//! The scheduler emits [`AlertEvent`](crate::holidays::AlertEvent) values
//! onto a channel; [`worker::run_notification_worker`] drains it into a
//! [`sink::NotificationSink`].

pub mod sink;
pub mod worker;

pub use sink::{LogNotificationSink, NotificationError, NotificationSink};
pub use worker::run_notification_worker;
