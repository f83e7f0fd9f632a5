//! Ephemeral notifications
//!
//! Toasts are independent of each other and disappear after a fixed delay.
//! [`ToastQueue`] tracks which ones are still visible; callers pass `now`
//! so expiry is deterministic.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Toast severity, mapped to a color by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

struct Entry {
    id: u64,
    toast: Toast,
    expires_at: Instant,
}

/// Visible toasts, oldest first
pub struct ToastQueue {
    duration: Duration,
    entries: VecDeque<Entry>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            entries: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Show a toast; returns its id
    pub fn push(&mut self, toast: Toast, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(Entry {
            id,
            toast,
            expires_at: now + self.duration,
        });
        id
    }

    /// Remove and return every toast whose delay has elapsed
    pub fn expire(&mut self, now: Instant) -> Vec<Toast> {
        let mut expired = Vec::new();
        self.entries.retain(|entry| {
            if entry.expires_at <= now {
                expired.push(entry.toast.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// Dismiss a toast before its delay elapses
    pub fn dismiss(&mut self, id: u64) -> Option<Toast> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(idx).map(|e| e.toast)
    }

    pub fn active(&self) -> impl Iterator<Item = &Toast> {
        self.entries.iter().map(|e| &e.toast)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires_after_delay() {
        let mut queue = ToastQueue::new(Duration::from_secs(3));
        let start = Instant::now();

        queue.push(Toast::success("Copied to clipboard!"), start);
        assert!(queue.expire(start + Duration::from_millis(2999)).is_empty());
        assert_eq!(queue.len(), 1);

        let expired = queue.expire(start + Duration::from_secs(3));
        assert_eq!(expired, vec![Toast::success("Copied to clipboard!")]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_toasts_are_independent() {
        let mut queue = ToastQueue::new(Duration::from_secs(3));
        let start = Instant::now();

        queue.push(Toast::info("first"), start);
        queue.push(Toast::warning("second"), start + Duration::from_secs(2));

        let expired = queue.expire(start + Duration::from_secs(4));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].message, "first");
        assert_eq!(queue.active().next().unwrap().message, "second");
    }

    #[test]
    fn test_dismiss() {
        let mut queue = ToastQueue::new(Duration::from_secs(3));
        let now = Instant::now();
        let id = queue.push(Toast::error("boom"), now);
        queue.push(Toast::info("other"), now);

        assert_eq!(queue.dismiss(id).unwrap().severity, Severity::Error);
        assert!(queue.dismiss(id).is_none());
        assert_eq!(queue.len(), 1);
    }
}
