//! Typed client for the Gus App JSON API

mod http;

pub use http::HttpBackend;

use crate::model::{GenerationRequest, HistoryTurn, Source, TokenUsage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the server
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with `success: false`
    #[error("Server rejected the request: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The error string supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected(Some(message)) if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// True when the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Body of `/chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryTurn>,
}

/// Success payload of `/chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub context_used: bool,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Success payload of `/api/generate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateReply {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    #[serde(default)]
    pub context_used: bool,
}

/// Body of `/api/critique`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueRequest {
    pub content: String,
    pub original_prompt: String,
}

/// Success payload of `/api/critique`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CritiqueReply {
    #[serde(default)]
    pub critique: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Body of `/api/refine`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefineRequest {
    pub original_content: String,
    pub critique: String,
}

/// Success payload of `/api/refine`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineReply {
    #[serde(default)]
    pub refined_content: String,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Reply of `/health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Body of `/analytics`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event: String,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

impl AnalyticsEvent {
    pub fn now(event: impl Into<String>) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self {
            event: event.into(),
            timestamp,
        }
    }
}

/// `{success: bool, error?: string, ...payload}`
#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: serde_json::Map<String, serde_json::Value>,
}

/// Parse a response body into its success payload.
///
/// `success: false` becomes [`ApiError::Rejected`]; anything that is not a
/// JSON object with a boolean `success` becomes [`ApiError::Decode`].
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(ApiError::Rejected(envelope.error));
    }
    Ok(serde_json::from_value(serde_json::Value::Object(envelope.payload))?)
}

/// Server operations the controllers depend on
#[async_trait]
pub trait Backend: Send + Sync {
    /// Ask the chat endpoint for a reply
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    /// Generate content from a prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateReply, ApiError>;

    /// Critique previously generated content
    async fn critique(&self, request: &CritiqueRequest) -> Result<CritiqueReply, ApiError>;

    /// Refine content using a critique
    async fn refine(&self, request: &RefineRequest) -> Result<RefineReply, ApiError>;

    /// Check that the server is up
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Report a usage event
    async fn track(&self, event: &AnalyticsEvent) -> Result<(), ApiError>;
}
