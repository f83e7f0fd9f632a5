//! Chat controller

use crate::api::{AnalyticsEvent, Backend, ChatRequest};
use crate::lifecycle::{failure_message, Fallbacks, InFlight, Outcome};
use crate::model::{ChatMessage, HistoryTurn};
use crate::view::ChatView;
use crate::ChatConfig;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when the server fails without saying why
pub const FALLBACK_ERROR: &str = "Maaf, ada gangguan. Coba lagi ya.";

/// Shown when the server could not be reached or answered with something unreadable
pub const CONNECTION_ERROR: &str = "Maaf, koneksi terputus. Coba lagi ya.";

const FALLBACKS: Fallbacks<'static> = Fallbacks {
    rejected: FALLBACK_ERROR,
    offline: CONNECTION_ERROR,
};

/// Drives a chat view: one message in flight at a time
pub struct ChatController {
    backend: Arc<dyn Backend>,
    view: Arc<dyn ChatView>,
    config: ChatConfig,
    analytics: bool,
    is_loading: AtomicBool,
    history: Mutex<Vec<HistoryTurn>>,
}

impl ChatController {
    pub fn new(backend: Arc<dyn Backend>, view: Arc<dyn ChatView>, config: ChatConfig) -> Self {
        Self {
            backend,
            view,
            config,
            analytics: false,
            is_loading: AtomicBool::new(false),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Report `message_sent` and `new_chat` events to `/analytics`
    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics = enabled;
        self
    }

    /// Turns that will accompany the next message
    pub fn history(&self) -> Vec<HistoryTurn> {
        self.history.lock().clone()
    }

    /// Send whatever is in the input
    pub async fn send_message(&self) -> Outcome {
        let message = self.view.input_text().trim().to_string();
        if message.is_empty() {
            return Outcome::Skipped;
        }

        let view = &self.view;
        let Some(_in_flight) = InFlight::claim(&self.is_loading).map(|guard| {
            guard.on_release(move || {
                view.hide_thinking();
                view.set_send_enabled(true);
                view.focus_input();
            })
        }) else {
            debug!("Message already in flight, ignoring send");
            return Outcome::Skipped;
        };

        self.view.append_message(&ChatMessage::user(&message));
        self.view.clear_input();
        self.view.set_send_enabled(false);
        self.view.show_thinking();

        let request = ChatRequest {
            message: message.clone(),
            history: self.recent_history(),
        };
        self.track("message_sent");

        info!(chars = message.len(), history = request.history.len(), "Sending chat message");
        let result = self.backend.chat(&request).await;
        self.view.hide_thinking();

        match result {
            Ok(reply) if !reply.response.is_empty() => {
                // Sources only count when the answer actually drew on them
                let sources = if reply.context_used {
                    reply.sources
                } else {
                    Vec::new()
                };
                debug!(
                    context_used = reply.context_used,
                    sources = sources.len(),
                    language = ?reply.language,
                    "Chat reply received"
                );

                self.remember(message, &reply.response);
                self.view
                    .append_message(&ChatMessage::bot(reply.response, sources));
                Outcome::Completed
            }
            Ok(_) => {
                warn!("Chat reply flagged success but carried no response");
                self.view.append_message(&ChatMessage::error(FALLBACK_ERROR));
                Outcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "Chat request failed");
                self.view
                    .append_message(&ChatMessage::error(failure_message(&err, &FALLBACKS)));
                Outcome::Failed
            }
        }
    }

    /// Reset the transcript to the welcome message
    pub fn new_chat(&self) {
        self.history.lock().clear();
        self.view.reset_to_welcome();
        self.view.focus_input();
        self.track("new_chat");
    }

    /// The last `history_limit` turns, never starting on an answer
    fn recent_history(&self) -> Vec<HistoryTurn> {
        let history = self.history.lock();
        let mut skip = history.len().saturating_sub(self.config.history_limit);
        // Turns are stored as question/answer pairs
        skip += skip % 2;
        history[skip..].to_vec()
    }

    fn remember(&self, question: String, answer: &str) {
        let mut history = self.history.lock();
        history.push(HistoryTurn::user(question));
        history.push(HistoryTurn::assistant(answer));
    }

    fn track(&self, event: &str) {
        if !self.analytics {
            return;
        }
        let backend = Arc::clone(&self.backend);
        let event = AnalyticsEvent::now(event);
        tokio::spawn(async move {
            if let Err(e) = backend.track(&event).await {
                debug!(event = %event.event, error = %e, "Analytics event dropped");
            }
        });
    }
}
