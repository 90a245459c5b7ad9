//! Chat-completion client: one outbound request per call, bounded by a deadline.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use betterprompt_core::Model;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::credentials::Credential;
use crate::error::OptimizeError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const APP_TITLE: &str = "Better Prompt - Prompt Optimizer";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

/// Everything the completion endpoint needs for one call, minus the credential.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: Model,
    pub system: String,
    pub user: String,
    pub deadline: Duration,
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Trimmed completion text, never empty.
    pub text: String,
    /// Token accounting exactly as the provider reported it.
    pub usage: Option<Value>,
    pub latency_ms: u64,
}

/// Result of checking a credential against the provider's model listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Slot has no credential, so nothing was checked.
    Unknown,
    Working,
    Error(u16),
    NetworkError,
}

impl ProbeStatus {
    pub fn label(&self) -> String {
        match self {
            ProbeStatus::Unknown => "unknown".into(),
            ProbeStatus::Working => "working".into(),
            ProbeStatus::Error(code) => format!("error-{code}"),
            ProbeStatus::NetworkError => "network-error".into(),
        }
    }
}

/// A chat-completion provider.
///
/// Implementations make exactly one attempt per call. Choosing another
/// credential after a failure is the caller's job.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    async fn complete(
        &self,
        credential: &Credential,
        request: &CompletionRequest,
    ) -> Result<Completion, OptimizeError>;

    /// Check whether a credential is accepted.
    async fn probe(&self, credential: &Credential) -> ProbeStatus;
}

/// OpenRouter (or any OpenAI-compatible) chat-completion endpoint.
pub struct OpenRouterClient {
    http: Client,
    base_url: String,
    site_url: String,
}

impl OpenRouterClient {
    pub fn new(base_url: &str, site_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            site_url: site_url.to_string(),
        }
    }

    fn with_headers(
        &self,
        builder: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .header("HTTP-Referer", self.site_url.as_str())
            .header("X-Title", APP_TITLE)
    }
}

impl Default for OpenRouterClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_SITE_URL)
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(
        &self,
        credential: &Credential,
        request: &CompletionRequest,
    ) -> Result<Completion, OptimizeError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": request.model.as_str(),
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });
        let deadline_secs = request.deadline.as_secs();

        let start = Instant::now();
        let resp = self
            .with_headers(self.http.post(&url), credential)
            .json(&body)
            .timeout(request.deadline)
            .send()
            .await
            .map_err(|e| transport_error(e, deadline_secs))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), model = %request.model, "completion request rejected");
            return Err(classify_status(status, &text));
        }

        let json: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                OptimizeError::Timeout(deadline_secs)
            } else {
                OptimizeError::MalformedResponse(e.to_string())
            }
        })?;
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(latency_ms, model = %request.model, "completion received");

        parse_completion(&json, latency_ms)
    }

    async fn probe(&self, credential: &Credential) -> ProbeStatus {
        let url = format!("{}/models", self.base_url);
        let result = self
            .with_headers(self.http.get(&url), credential)
            .timeout(Duration::from_secs(10))
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => ProbeStatus::Working,
            Ok(resp) => ProbeStatus::Error(resp.status().as_u16()),
            Err(e) => {
                warn!("credential probe failed: {}", e.without_url());
                ProbeStatus::NetworkError
            }
        }
    }
}

/// Map a non-success status onto the error taxonomy.
pub fn classify_status(status: StatusCode, body: &str) -> OptimizeError {
    match status {
        StatusCode::UNAUTHORIZED => OptimizeError::Unauthorized,
        StatusCode::PAYMENT_REQUIRED => OptimizeError::QuotaExceeded,
        StatusCode::TOO_MANY_REQUESTS => OptimizeError::RateLimited,
        other => OptimizeError::upstream(other.as_u16(), body),
    }
}

/// Pull `choices[0].message.content` out of a completion body.
pub fn parse_completion(json: &Value, latency_ms: u64) -> Result<Completion, OptimizeError> {
    let text = json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or("");
    if text.is_empty() {
        return Err(OptimizeError::EmptyCompletion);
    }
    let usage = match &json["usage"] {
        Value::Null => None,
        other => Some(other.clone()),
    };
    Ok(Completion {
        text: text.to_string(),
        usage,
        latency_ms,
    })
}

fn transport_error(e: reqwest::Error, deadline_secs: u64) -> OptimizeError {
    if e.is_timeout() {
        warn!("completion request timed out after {deadline_secs}s");
        OptimizeError::Timeout(deadline_secs)
    } else {
        let msg = e.without_url().to_string();
        warn!("completion request failed: {msg}");
        OptimizeError::NetworkUnreachable(msg)
    }
}
