//! Gus client - chat and content-generation controllers for the Gus App API
//!
//! This crate provides:
//! - A typed client for the JSON-over-HTTP endpoints (`/chat`, `/api/generate`,
//!   `/api/critique`, `/api/refine`, `/health`, `/analytics`)
//! - `ChatController` and `GeneratorController`, which own the request
//!   lifecycle and drive any view through the traits in [`view`]
//! - An HTML renderer for chat messages and citation sources

pub mod api;
pub mod chat;
pub mod clipboard;
pub mod generator;
pub mod input;
pub mod lifecycle;
pub mod model;
pub mod render;
pub mod toast;
pub mod view;

#[cfg(test)]
mod testing;

pub use api::{ApiError, Backend, HttpBackend};
pub use chat::ChatController;
pub use generator::GeneratorController;
pub use lifecycle::Outcome;

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level client configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GusConfig {
    /// Base URL of the Gus App server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Chat controller settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// HTML rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Toast notification settings
    #[serde(default)]
    pub toast: ToastConfig,

    /// Usage event reporting
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for GusConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http: HttpConfig::default(),
            chat: ChatConfig::default(),
            render: RenderConfig::default(),
            toast: ToastConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl GusConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

/// HTTP transport configuration
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds. Requests never time out when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Chat controller configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChatConfig {
    /// Number of previous turns sent as `history` (0 disables it).
    /// Odd limits round down to whole question/answer pairs.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize { 12 }

/// HTML rendering configuration
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RenderConfig {
    /// Inject server text as markup instead of escaping it
    #[serde(default)]
    pub trust_server_html: bool,
}

/// Toast configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ToastConfig {
    /// How long a toast stays visible
    #[serde(default = "default_toast_duration_ms")]
    pub duration_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_toast_duration_ms(),
        }
    }
}

impl ToastConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

fn default_toast_duration_ms() -> u64 { 3000 }

/// Analytics configuration
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct AnalyticsConfig {
    /// Post usage events to `/analytics`
    #[serde(default)]
    pub enabled: bool,
}
