//! reqwest implementation of [`Backend`]

use super::{
    parse_envelope, AnalyticsEvent, ApiError, Backend, ChatReply, ChatRequest, CritiqueReply,
    CritiqueRequest, GenerateReply, HealthStatus, RefineReply, RefineRequest,
};
use crate::model::GenerationRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Client for a Gus App server reachable over HTTP
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend without a request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    /// Create a backend, optionally bounding every request by `timeout`
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and unwrap the `{success, ...}` envelope.
    ///
    /// The body is parsed whatever the HTTP status: the server reports
    /// application failures as 4xx/5xx responses carrying the envelope.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let start = Instant::now();

        let response = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_success() {
            debug!(endpoint = path, %status, duration_ms, "Request completed");
        } else {
            warn!(endpoint = path, %status, duration_ms, "Server returned error status");
        }

        parse_envelope(&text)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.post("/chat", request).await
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateReply, ApiError> {
        self.post("/api/generate", request).await
    }

    async fn critique(&self, request: &CritiqueRequest) -> Result<CritiqueReply, ApiError> {
        self.post("/api/critique", request).await
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineReply, ApiError> {
        self.post("/api/refine", request).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn track(&self, event: &AnalyticsEvent) -> Result<(), ApiError> {
        self.post::<_, serde::de::IgnoredAny>("/analytics", event)
            .await
            .map(|_| ())
    }
}
