//! Transient user-facing notifications.
//!
//! At most one toast is visible at a time; showing a new one replaces the
//! previous one, and a toast disappears once its duration has elapsed.

use std::time::{Duration, Instant};

/// Kind of toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            ToastKind::Info => "ℹ",
            ToastKind::Success => "✓",
            ToastKind::Warning => "⚠",
            ToastKind::Error => "✗",
        }
    }
}

/// A toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Check if this toast has expired
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Display slot for toasts.
#[derive(Debug, Clone)]
pub struct NotificationService {
    current: Option<Toast>,
    duration: Duration,
    shown: u64,
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl NotificationService {
    /// Create a service whose toasts stay visible for `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
            shown: 0,
        }
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.current = Some(Toast::new(kind, message, self.duration));
        self.shown += 1;
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    /// The visible toast, if any has been shown and not yet expired.
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref().filter(|t| !t.is_expired())
    }

    /// The most recent toast, even if it has expired.
    pub fn last(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    /// Number of toasts shown so far. Front-ends compare this between frames
    /// to detect a fresh toast.
    pub fn shown(&self) -> u64 {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_toast_replaces_previous() {
        let mut notifications = NotificationService::default();
        notifications.success("saved");
        notifications.error("failed");

        let toast = notifications.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "failed");
        assert_eq!(notifications.shown(), 2);
    }

    #[test]
    fn test_toast_expires() {
        let mut notifications = NotificationService::new(Duration::ZERO);
        notifications.info("gone already");

        assert!(notifications.current().is_none());
        assert_eq!(notifications.last().unwrap().message, "gone already");
    }

    #[test]
    fn test_hide() {
        let mut notifications = NotificationService::default();
        notifications.success("saved");
        notifications.hide();
        assert!(notifications.current().is_none());
        assert!(notifications.last().is_none());
    }
}
