//! System clipboard access for the generator's copy action

use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Failed to initialize clipboard: {0}")]
    Unavailable(String),

    #[error("Failed to set clipboard text: {0}")]
    Write(String),
}

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard, opened fresh for every copy
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            error!(error = %e, "Clipboard unavailable");
            ClipboardError::Unavailable(e.to_string())
        })?;

        clipboard.set_text(text).map_err(|e| {
            error!(error = %e, "Clipboard write failed");
            ClipboardError::Write(e.to_string())
        })
    }
}
