//! User-facing notification sinks.
use std::sync::Mutex;

use crate::Notifier;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Forwards notifications to the `log` facade; the default for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Info => log::info!("{message}"),
            NotificationLevel::Warning => log::warn!("{message}"),
            NotificationLevel::Error => log::error!("{message}"),
        }
    }
}

/// Keeps every notification so callers can inspect what a user would have seen.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notifications sent so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<(NotificationLevel, String)> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((level, message.to_string()));
        }
    }
}
