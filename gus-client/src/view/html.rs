//! In-memory HTML chat document

use super::ChatView;
use crate::input::{auto_grow, AutoGrow};
use crate::model::ChatMessage;
use crate::render::{
    loading_indicator, render_message, RenderOptions, DISCLAIMER_HTML, LOADING_MESSAGE_ID,
    WELCOME_HTML,
};
use parking_lot::Mutex;

/// Height of one line of input text, padding included once per input
const INPUT_LINE_HEIGHT_PX: u32 = 24;
const INPUT_PADDING_PX: u32 = 24;

struct Node {
    id: Option<&'static str>,
    html: String,
}

struct Document {
    nodes: Vec<Node>,
    input: String,
    input_height: Option<AutoGrow>,
    send_enabled: bool,
    focused: bool,
}

/// A chat area kept as a list of rendered HTML nodes.
///
/// Mirrors what the browser page holds: the message list, the input field
/// with its auto-grow height, and the send button state.
pub struct HtmlChatView {
    options: RenderOptions,
    doc: Mutex<Document>,
}

impl HtmlChatView {
    /// A fresh chat area showing the welcome message
    pub fn new(options: RenderOptions) -> Self {
        let view = Self {
            options,
            doc: Mutex::new(Document {
                nodes: Vec::new(),
                input: String::new(),
                input_height: None,
                send_enabled: true,
                focused: false,
            }),
        };
        view.reset_to_welcome();
        view
    }

    /// Type into the input, growing it up to its cap
    pub fn set_input(&self, text: &str) {
        let lines = text.split('\n').count() as u32;
        let mut doc = self.doc.lock();
        doc.input = text.to_string();
        doc.input_height = Some(auto_grow(lines * INPUT_LINE_HEIGHT_PX + INPUT_PADDING_PX));
    }

    /// `None` while the input has its natural height
    pub fn input_height(&self) -> Option<AutoGrow> {
        self.doc.lock().input_height
    }

    pub fn send_enabled(&self) -> bool {
        self.doc.lock().send_enabled
    }

    pub fn is_focused(&self) -> bool {
        self.doc.lock().focused
    }

    pub fn is_thinking(&self) -> bool {
        self.doc
            .lock()
            .nodes
            .iter()
            .any(|n| n.id == Some(LOADING_MESSAGE_ID))
    }

    pub fn node_count(&self) -> usize {
        self.doc.lock().nodes.len()
    }

    /// The chat area as one HTML fragment
    pub fn document(&self) -> String {
        let doc = self.doc.lock();
        let mut html = String::from(r#"<div class="chat-area" id="chatArea">"#);
        for node in &doc.nodes {
            html.push_str(&node.html);
        }
        html.push_str("</div>");
        html
    }
}

impl ChatView for HtmlChatView {
    fn input_text(&self) -> String {
        self.doc.lock().input.clone()
    }

    fn clear_input(&self) {
        let mut doc = self.doc.lock();
        doc.input.clear();
        doc.input_height = None;
    }

    fn focus_input(&self) {
        self.doc.lock().focused = true;
    }

    fn set_send_enabled(&self, enabled: bool) {
        self.doc.lock().send_enabled = enabled;
    }

    fn append_message(&self, message: &ChatMessage) {
        let html = render_message(message, self.options);
        self.doc.lock().nodes.push(Node { id: None, html });
    }

    fn show_thinking(&self) {
        self.doc.lock().nodes.push(Node {
            id: Some(LOADING_MESSAGE_ID),
            html: loading_indicator(),
        });
    }

    fn hide_thinking(&self) {
        self.doc
            .lock()
            .nodes
            .retain(|n| n.id != Some(LOADING_MESSAGE_ID));
    }

    fn reset_to_welcome(&self) {
        let mut doc = self.doc.lock();
        doc.nodes = vec![
            Node {
                id: None,
                html: WELCOME_HTML.to_string(),
            },
            Node {
                id: None,
                html: DISCLAIMER_HTML.to_string(),
            },
        ];
        doc.focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::INPUT_MAX_HEIGHT_PX;

    #[test]
    fn test_starts_with_welcome() {
        let view = HtmlChatView::new(RenderOptions::default());
        let html = view.document();
        assert!(html.contains("Assalamu'alaikum!"));
        assert!(html.contains("bukan fatwa resmi"));
        assert_eq!(view.node_count(), 2);
    }

    #[test]
    fn test_thinking_indicator_toggles() {
        let view = HtmlChatView::new(RenderOptions::default());
        view.show_thinking();
        assert!(view.is_thinking());
        assert!(view.document().contains("Sedang berpikir..."));

        view.hide_thinking();
        view.hide_thinking();
        assert!(!view.is_thinking());
        assert_eq!(view.node_count(), 2);
    }

    #[test]
    fn test_input_grows_then_scrolls() {
        let view = HtmlChatView::new(RenderOptions::default());
        view.set_input("one line");
        assert_eq!(view.input_height().unwrap().height_px, 48);

        view.set_input("1\n2\n3\n4\n5\n6\n7");
        let height = view.input_height().unwrap();
        assert_eq!(height.height_px, INPUT_MAX_HEIGHT_PX);
        assert!(height.scrolls);

        view.clear_input();
        assert!(view.input_height().is_none());
        assert_eq!(view.input_text(), "");
    }
}
