//! Fakes shared by controller tests

use crate::api::{
    AnalyticsEvent, ApiError, Backend, ChatReply, ChatRequest, CritiqueReply, CritiqueRequest,
    GenerateReply, HealthStatus, RefineReply, RefineRequest,
};
use crate::clipboard::{Clipboard, ClipboardError};
use crate::generator::form::GeneratorForm;
use crate::model::{ChatMessage, GenerationRequest, GenerationResult};
use crate::toast::Toast;
use crate::view::{ChatView, CritiquePanel, GeneratorView, PanelState};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// A real reqwest error from a request that can never be sent
pub async fn transport_error() -> ApiError {
    let err = reqwest::Client::new()
        .get("not a url")
        .send()
        .await
        .unwrap_err();
    ApiError::Transport(err)
}

pub fn decode_error() -> ApiError {
    ApiError::Decode(serde_json::from_str::<serde_json::Value>("<html>").unwrap_err())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Chat(ChatRequest),
    Generate(GenerationRequest),
    Critique(CritiqueRequest),
    Refine(RefineRequest),
    Health,
    Track(String),
}

/// Backend answering from per-endpoint queues.
///
/// An empty queue answers with `Rejected(None)`. When gated, every call
/// except `track` waits for one `notify_one` on the gate before answering.
#[derive(Default)]
pub struct FakeBackend {
    chat: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    generate: Mutex<VecDeque<Result<GenerateReply, ApiError>>>,
    critique: Mutex<VecDeque<Result<CritiqueReply, ApiError>>>,
    refine: Mutex<VecDeque<Result<RefineReply, ApiError>>>,
    calls: Mutex<Vec<Call>>,
    gate: Option<Arc<Notify>>,
    tracked: Option<mpsc::UnboundedSender<String>>,
}

impl FakeBackend {
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn tracking() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = Self {
            tracked: Some(tx),
            ..Default::default()
        };
        (backend, rx)
    }

    pub fn push_chat(&self, reply: Result<ChatReply, ApiError>) {
        self.chat.lock().push_back(reply);
    }

    pub fn push_generate(&self, reply: Result<GenerateReply, ApiError>) {
        self.generate.lock().push_back(reply);
    }

    pub fn push_critique(&self, reply: Result<CritiqueReply, ApiError>) {
        self.critique.lock().push_back(reply);
    }

    pub fn push_refine(&self, reply: Result<RefineReply, ApiError>) {
        self.refine.lock().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Chat(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    async fn wait(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
        queue
            .lock()
            .pop_front()
            .unwrap_or(Err(ApiError::Rejected(None)))
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.record(Call::Chat(request.clone()));
        self.wait().await;
        Self::next(&self.chat)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateReply, ApiError> {
        self.record(Call::Generate(request.clone()));
        self.wait().await;
        Self::next(&self.generate)
    }

    async fn critique(&self, request: &CritiqueRequest) -> Result<CritiqueReply, ApiError> {
        self.record(Call::Critique(request.clone()));
        self.wait().await;
        Self::next(&self.critique)
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineReply, ApiError> {
        self.record(Call::Refine(request.clone()));
        self.wait().await;
        Self::next(&self.refine)
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record(Call::Health);
        Ok(HealthStatus {
            status: "ok".to_string(),
            service: None,
        })
    }

    async fn track(&self, event: &AnalyticsEvent) -> Result<(), ApiError> {
        self.record(Call::Track(event.event.clone()));
        if let Some(tx) = &self.tracked {
            let _ = tx.send(event.event.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Appended(ChatMessage),
    InputCleared,
    Focused,
    SendEnabled(bool),
    ThinkingShown,
    ThinkingHidden,
    Reset,
}

/// Chat view that records every call in order
#[derive(Default)]
pub struct RecordingChatView {
    input: Mutex<String>,
    events: Mutex<Vec<ChatEvent>>,
}

impl RecordingChatView {
    pub fn with_input(text: &str) -> Self {
        let view = Self::default();
        view.set_input(text);
        view
    }

    pub fn set_input(&self, text: &str) {
        *self.input.lock() = text.to_string();
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChatEvent::Appended(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Last send-button state; enabled until told otherwise
    pub fn send_enabled(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .find_map(|e| match e {
                ChatEvent::SendEnabled(enabled) => Some(*enabled),
                _ => None,
            })
            .unwrap_or(true)
    }

    pub fn thinking(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .find_map(|e| match e {
                ChatEvent::ThinkingShown => Some(true),
                ChatEvent::ThinkingHidden | ChatEvent::Reset => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    fn push(&self, event: ChatEvent) {
        self.events.lock().push(event);
    }
}

impl ChatView for RecordingChatView {
    fn input_text(&self) -> String {
        self.input.lock().clone()
    }

    fn clear_input(&self) {
        self.input.lock().clear();
        self.push(ChatEvent::InputCleared);
    }

    fn focus_input(&self) {
        self.push(ChatEvent::Focused);
    }

    fn set_send_enabled(&self, enabled: bool) {
        self.push(ChatEvent::SendEnabled(enabled));
    }

    fn append_message(&self, message: &ChatMessage) {
        self.push(ChatEvent::Appended(message.clone()));
    }

    fn show_thinking(&self) {
        self.push(ChatEvent::ThinkingShown);
    }

    fn hide_thinking(&self) {
        self.push(ChatEvent::ThinkingHidden);
    }

    fn reset_to_welcome(&self) {
        self.push(ChatEvent::Reset);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorEvent {
    Panel(PanelState),
    Content(GenerationResult),
    Critique(CritiquePanel),
    CritiqueEnabled(bool),
    Toast(Toast),
}

/// Generator view that records every call in order
#[derive(Default)]
pub struct RecordingGeneratorView {
    form: Mutex<GeneratorForm>,
    events: Mutex<Vec<GeneratorEvent>>,
}

impl RecordingGeneratorView {
    pub fn with_prompt(prompt: &str) -> Self {
        let view = Self::default();
        view.form.lock().prompt = prompt.to_string();
        view
    }

    pub fn edit_form(&self, edit: impl FnOnce(&mut GeneratorForm)) {
        edit(&mut self.form.lock());
    }

    pub fn events(&self) -> Vec<GeneratorEvent> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                GeneratorEvent::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn panel(&self) -> Option<PanelState> {
        self.events().into_iter().rev().find_map(|e| match e {
            GeneratorEvent::Panel(p) => Some(p),
            _ => None,
        })
    }

    pub fn critique_panel(&self) -> Option<CritiquePanel> {
        self.events().into_iter().rev().find_map(|e| match e {
            GeneratorEvent::Critique(c) => Some(c),
            _ => None,
        })
    }

    pub fn critique_enabled(&self) -> bool {
        self.events()
            .into_iter()
            .rev()
            .find_map(|e| match e {
                GeneratorEvent::CritiqueEnabled(enabled) => Some(enabled),
                _ => None,
            })
            .unwrap_or(true)
    }

    pub fn content(&self) -> Option<GenerationResult> {
        self.events().into_iter().rev().find_map(|e| match e {
            GeneratorEvent::Content(r) => Some(r),
            _ => None,
        })
    }

    fn push(&self, event: GeneratorEvent) {
        self.events.lock().push(event);
    }
}

impl GeneratorView for RecordingGeneratorView {
    fn form(&self) -> GeneratorForm {
        self.form.lock().clone()
    }

    fn set_panel(&self, state: PanelState) {
        self.push(GeneratorEvent::Panel(state));
    }

    fn show_content(&self, result: &GenerationResult) {
        self.push(GeneratorEvent::Content(result.clone()));
    }

    fn set_critique_panel(&self, panel: CritiquePanel) {
        self.push(GeneratorEvent::Critique(panel));
    }

    fn set_critique_enabled(&self, enabled: bool) {
        self.push(GeneratorEvent::CritiqueEnabled(enabled));
    }

    fn show_toast(&self, toast: Toast) {
        self.push(GeneratorEvent::Toast(toast));
    }
}

/// Clipboard that keeps the last copied text, or refuses every write
#[derive(Default)]
pub struct FakeClipboard {
    pub contents: Mutex<Option<String>>,
    pub broken: bool,
}

impl FakeClipboard {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }
}

impl Clipboard for FakeClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.broken {
            return Err(ClipboardError::Unavailable("no display".to_string()));
        }
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}
