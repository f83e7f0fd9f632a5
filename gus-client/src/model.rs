//! Records shared by the controllers and views

use serde::{Deserialize, Deserializer, Serialize};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
    Error,
}

impl Role {
    /// CSS class prefix used by the chat area (`user-message`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::Error => "error",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of material a citation points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Video,
    #[default]
    #[serde(other)]
    Document,
}

/// A citation attached to a bot reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Missing or null becomes an empty string
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Source {
    /// "channel • date", skipping whichever part is missing
    pub fn meta(&self) -> String {
        let channel = self.channel.as_deref().unwrap_or("").trim();
        match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) if channel.is_empty() => format!("• {}", date),
            Some(date) => format!("{} • {}", channel, date),
            None => channel.to_string(),
        }
    }
}

/// A rendered entry of the chat transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub role: Role,
    pub sources: Vec<Source>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::User,
            sources: Vec::new(),
        }
    }

    pub fn bot(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            text: text.into(),
            role: Role::Bot,
            sources,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Error,
            sources: Vec::new(),
        }
    }
}

/// One previous turn sent back to the server for multi-turn context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `/api/generate`, built fresh from the form on every submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub persona: String,
    pub custom_prompt: String,
    pub use_ragie: bool,
    pub ragie_query: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn summary(&self) -> String {
        format!(
            "{} tokens ({} prompt + {} completion)",
            self.total_tokens, self.prompt_tokens, self.completion_tokens
        )
    }
}

/// The content currently shown in the generator panel
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Feedback on the current [`GenerationResult`]
#[derive(Debug, Clone, PartialEq)]
pub struct Critique {
    pub text: String,
}
