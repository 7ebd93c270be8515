use std::sync::Arc;

use tokio::sync::mpsc;

use crate::alerts::sink::NotificationSink;
use crate::holidays::AlertEvent;

/// Deliver every event received on `events` until all senders are
/// dropped. A failed delivery is logged and the worker moves on.
///
/// Returns the number of successful deliveries.
pub async fn run_notification_worker(
    mut events: mpsc::Receiver<AlertEvent>,
    sink: Arc<dyn NotificationSink + Send + Sync>,
) -> usize {
    tracing::info!("Notification worker started (sink: {})", sink.sink_name());
    let mut delivered = 0;

    while let Some(event) = events.recv().await {
        match sink.deliver(&event).await {
            Ok(()) => delivered += 1,
            Err(err) => tracing::error!(
                "Failed to deliver alert for {} on {} via {}: {}",
                event.holiday.name,
                event.holiday.date,
                sink.sink_name(),
                err
            ),
        }
    }

    tracing::info!("Notification worker stopped after {} deliveries", delivered);
    delivered
}
