use async_trait::async_trait;
use thiserror::Error;

use crate::holidays::AlertEvent;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Delivery failed: {message}")]
    Delivery { message: String },
}

/// Final hop for an alert (email, SMS, chat...).
#[async_trait]
pub trait NotificationSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), NotificationError>;

    fn sink_name(&self) -> &str;
}

/// Stand-in delivery that only logs the alert.
#[derive(Debug, Default, Clone)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn deliver(&self, event: &AlertEvent) -> Result<(), NotificationError> {
        tracing::info!(
            country = %event.country_code,
            date = %event.holiday.date,
            "Upcoming holiday: {}",
            event.holiday.name
        );
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}
