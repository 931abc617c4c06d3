// ── User notifications ──
//
// Stores report the outcome of every remote operation as a short notice.
// Notices fan out over a broadcast channel (the CLI prints them) and are
// always mirrored to tracing, so nothing is lost when nobody subscribes.

use tokio::sync::broadcast;
use tracing::{info, warn};

const NOTICE_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Cheaply cloneable notice publisher.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(notice = %message);
        self.emit(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(notice = %message);
        self.emit(NoticeLevel::Error, message);
    }

    fn emit(&self, level: NoticeLevel, message: String) {
        // No receivers is fine; the notice has already been logged.
        let _ = self.tx.send(Notice { level, message });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn notices_reach_subscribers_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("Created appointment");
        notifier.error("Could not update appointment");

        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Success);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, NoticeLevel::Error);
        assert_eq!(second.message, "Could not update appointment");
    }

    #[test]
    fn emitting_without_subscribers_is_harmless() {
        Notifier::new().error("nobody listening");
    }
}
