use shared::protocol::Notification;
use tokio::sync::broadcast;
use tracing::debug;

const NOTIFICATION_BUFFER: usize = 64;

/// Fan-out of user-facing notifications. Publishing never waits on readers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self { tx }
    }

    pub fn notify(&self, notification: Notification) {
        debug!(
            level = ?notification.level,
            duration_ms = notification.duration_ms,
            message = %notification.message,
            "notification"
        );
        // No subscribers is fine: nobody is looking.
        let _ = self.tx.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}
