//! View-port traits the controllers render through
//!
//! A controller never touches a rendering target directly. Front-ends (the
//! terminal CLI, the in-memory HTML document, test recorders) implement
//! these traits.

mod html;

pub use html::HtmlChatView;

use crate::generator::form::GeneratorForm;
use crate::model::{ChatMessage, GenerationResult};
use crate::toast::Toast;

/// Surface driven by [`crate::ChatController`]
pub trait ChatView: Send + Sync {
    /// Current contents of the message input
    fn input_text(&self) -> String;

    /// Empty the input and reset its height
    fn clear_input(&self);

    fn focus_input(&self);

    fn set_send_enabled(&self, enabled: bool);

    /// Append a message to the end of the list and scroll to it
    fn append_message(&self, message: &ChatMessage);

    /// Append the transient thinking indicator
    fn show_thinking(&self);

    /// Remove the thinking indicator; does nothing when it is not shown
    fn hide_thinking(&self);

    /// Replace the whole list with the welcome message and disclaimer
    fn reset_to_welcome(&self);
}

/// Main panel of the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Empty,
    Loading,
    Content,
}

/// Critique overlay, layered on [`PanelState::Content`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CritiquePanel {
    Hidden,
    Loading,
    Shown(String),
    Error(String),
}

/// Surface driven by [`crate::GeneratorController`]
pub trait GeneratorView: Send + Sync {
    /// Snapshot of the form fields
    fn form(&self) -> GeneratorForm;

    fn set_panel(&self, state: PanelState);

    /// Display content and its token usage
    fn show_content(&self, result: &GenerationResult);

    fn set_critique_panel(&self, panel: CritiquePanel);

    fn set_critique_enabled(&self, enabled: bool);

    fn show_toast(&self, toast: Toast);
}
