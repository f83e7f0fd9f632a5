//! Request lifecycle shared by both controllers
//!
//! Every action follows the same shape: claim a latch, disable the control,
//! issue one request, render the result, then restore the control no matter
//! which branch ran. [`InFlight`] is the latch; its `Drop` runs the restore
//! step and releases the latch.

use crate::api::ApiError;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a controller action ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Input was empty, a precondition failed, or a request was already in flight
    Skipped,
    /// The request succeeded and the view shows the result
    Completed,
    /// The request failed and the view shows the error
    Failed,
}

/// Held while a request of one action class is outstanding
pub struct InFlight<'a> {
    flag: &'a AtomicBool,
    on_release: Option<Box<dyn FnOnce() + Send + 'a>>,
}

impl<'a> InFlight<'a> {
    /// Claim the latch, or `None` if a request is already outstanding
    pub fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag,
                on_release: None,
            })
    }

    /// Run `restore` when the request finishes, before the latch is released
    pub fn on_release(mut self, restore: impl FnOnce() + Send + 'a) -> Self {
        self.on_release = Some(Box::new(restore));
        self
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(restore) = self.on_release.take() {
            restore();
        }
        self.flag.store(false, Ordering::Release);
    }
}

/// User-facing strings for a failed action
pub struct Fallbacks<'a> {
    /// Shown for `success: false` without a message
    pub rejected: &'a str,
    /// Shown when the server could not be reached or its body is not an envelope
    pub offline: &'a str,
}

/// Pick the message to show for a failed request
pub fn failure_message(err: &ApiError, fallbacks: &Fallbacks<'_>) -> String {
    match err {
        ApiError::Transport(_) | ApiError::Decode(_) => fallbacks.offline.to_string(),
        _ => err
            .server_message()
            .unwrap_or(fallbacks.rejected)
            .to_string(),
    }
}
