//! Optimization error taxonomy.

use thiserror::Error;

/// Upstream bodies are cut to this many characters before they are surfaced.
const MAX_BODY_CHARS: usize = 500;

/// Errors that can occur while optimizing a prompt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptimizeError {
    /// The prompt was empty after trimming.
    #[error("Prompt is required")]
    EmptyPrompt,

    /// A model, tone or type outside the supported set.
    #[error("{0}")]
    InvalidOption(String),

    /// Neither credential slot is configured.
    #[error("OpenRouter API keys not configured")]
    NotConfigured,

    /// The completion service rejected the credential.
    #[error("Invalid API key or insufficient permissions. Please check your OpenRouter API key.")]
    Unauthorized,

    /// The credential has no balance left.
    #[error("Insufficient credits or quota exceeded. Try a different free model.")]
    QuotaExceeded,

    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,

    /// The deadline elapsed before a response arrived.
    #[error("Request timeout after {0}s - please try again")]
    Timeout(u64),

    /// The completion service could not be reached.
    #[error("Unable to connect to OpenRouter API: {0}")]
    NetworkUnreachable(String),

    /// Any other non-success status from the completion service.
    #[error("OpenRouter API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// A success response that carried no completion text.
    #[error("No optimized prompt received")]
    EmptyCompletion,

    /// A success response whose body could not be decoded.
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

impl OptimizeError {
    pub fn upstream(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > MAX_BODY_CHARS {
            let cut: String = body.chars().take(MAX_BODY_CHARS).collect();
            format!("{cut}...")
        } else {
            body.to_string()
        };
        OptimizeError::Upstream { status, body }
    }

    /// Failures on the primary slot that justify one attempt on the secondary.
    pub fn triggers_failover(&self) -> bool {
        matches!(
            self,
            OptimizeError::RateLimited
                | OptimizeError::QuotaExceeded
                | OptimizeError::NetworkUnreachable(_)
        )
    }

    /// Failures for which the local rewriter is substituted.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            OptimizeError::NetworkUnreachable(_)
                | OptimizeError::Timeout(_)
                | OptimizeError::Unauthorized
                | OptimizeError::QuotaExceeded
                | OptimizeError::RateLimited
        )
    }

    /// Short cause shown next to a locally optimized result.
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            OptimizeError::NetworkUnreachable(_) => "OpenRouter service unavailable",
            OptimizeError::Timeout(_) => "Request timeout",
            OptimizeError::Unauthorized => "Authentication failed",
            OptimizeError::QuotaExceeded => "Insufficient credits",
            OptimizeError::RateLimited => "Rate limited",
            _ => "OpenRouter unavailable",
        }
    }

    /// HTTP status this failure maps to when surfaced to a caller.
    pub fn http_status(&self) -> u16 {
        match self {
            OptimizeError::EmptyPrompt | OptimizeError::InvalidOption(_) => 400,
            OptimizeError::Unauthorized => 401,
            OptimizeError::QuotaExceeded => 402,
            OptimizeError::Timeout(_) => 408,
            OptimizeError::RateLimited => 429,
            OptimizeError::NetworkUnreachable(_) => 503,
            OptimizeError::Upstream { status, .. } if (400..=599).contains(status) => *status,
            OptimizeError::Upstream { .. } | OptimizeError::MalformedResponse(_) => 502,
            OptimizeError::NotConfigured | OptimizeError::EmptyCompletion => 500,
        }
    }
}

impl From<betterprompt_core::BetterPromptError> for OptimizeError {
    fn from(e: betterprompt_core::BetterPromptError) -> Self {
        OptimizeError::InvalidOption(e.to_string())
    }
}
