//! User-visible notifications.
//!
//! Controllers report outcomes through a [`Notifier`] instead of printing,
//! so the terminal front end and tests can each supply their own sink.

use std::sync::{Mutex, PoisonError};

use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
    /// Neutral information.
    Info,
}

/// Sink for messages meant for the user.
pub trait Notifier: Send + Sync {
    /// Report a successful operation.
    fn success(&self, message: &str);

    /// Report a failure.
    fn error(&self, message: &str);

    /// Report neutral information.
    fn info(&self, message: &str);
}

/// Routes notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(notification = "success", "{message}");
    }

    fn error(&self, message: &str) {
        error!(notification = "error", "{message}");
    }

    fn info(&self, message: &str) {
        info!(notification = "info", "{message}");
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    /// Every notification so far, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages recorded at `level`.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(recorded, _)| *recorded == level)
            .map(|(_, message)| message)
            .collect()
    }

    /// Most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn push(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }
}
