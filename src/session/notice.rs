//! Non-fatal user notifications raised by the editors.

use std::sync::{Mutex, PoisonError};

use tracing::{error, info};

/// Severity of a notice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeLevel {
    /// Progress.
    Info,
    /// Operation completed.
    Success,
    /// Operation failed.
    Error,
}

/// A message for the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Failure notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    /// Show `notice` to the user.
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!(message = %notice.message, "user notice"),
            NoticeLevel::Info | NoticeLevel::Success => {
                info!(message = %notice.message, "user notice");
            }
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the notices received so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether any error notice was received.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.notices().iter().any(|n| n.level == NoticeLevel::Error)
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_log_collects_and_drains() {
        let log = NoticeLog::new();
        log.notify(Notice::success("saved"));
        assert!(!log.has_error());
        log.notify(Notice::error("quota"));
        assert!(log.has_error());

        let drained = log.take();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1], Notice::error("quota"));
        assert!(log.notices().is_empty());
    }
}
