use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::message::{StayEventKind, StayMessage};
use crate::queue::NotificationQueue;

/// Fire-and-forget sender for stay notifications.
///
/// Each send runs on its own task. Failures are logged and dropped; the
/// state change that triggered them stands.
#[derive(Clone)]
pub struct Notifier {
    queue: Arc<dyn NotificationQueue>,
}

impl Notifier {
    pub fn new(queue: Arc<dyn NotificationQueue>) -> Self {
        Self { queue }
    }

    /// Send `message` in the background, inside the caller's span. The
    /// handle is only useful to tests; callers normally drop it.
    pub fn notify(&self, message: StayMessage) -> JoinHandle<()> {
        let queue = self.queue.clone();
        let task = async move {
            let event = message.event;
            let stay_id = message.stay_id.clone();
            match queue.send(message).await {
                Ok(receipt) if receipt.duplicate => {
                    tracing::debug!(%event, %stay_id, "Notification deduplicated");
                }
                Ok(receipt) => {
                    tracing::debug!(%event, %stay_id, message_id = %receipt.message_id, "Notification sent");
                }
                Err(err) => {
                    tracing::warn!(%event, %stay_id, error = %err, "Notification failed");
                }
            }
        };
        tokio::spawn(task.instrument(tracing::Span::current()))
    }

    pub fn stay_event(
        &self,
        event: StayEventKind,
        hotel_id: &str,
        room_id: &str,
        stay_id: &str,
    ) -> JoinHandle<()> {
        self.notify(StayMessage::new(event, hotel_id, room_id, stay_id))
    }
}
