//! Per-request orchestration: validate, build the instruction, try the
//! primary slot, fail over once to the secondary, classify what is left.

use std::sync::Arc;
use std::time::Duration;

use betterprompt_core::options::resolve_option;
use betterprompt_core::{Model, PromptType, Tone};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{Completion, CompletionBackend, CompletionRequest, ProbeStatus};
use crate::credentials::{Credential, Credentials, CreditSource};
use crate::error::OptimizeError;
use crate::instruction::build_system_instruction;
use crate::local;

/// Hard deadline for a single completion call.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationRequest {
    pub raw_prompt: String,
    pub model: Model,
    pub tone: Tone,
    pub prompt_type: PromptType,
}

impl OptimizationRequest {
    /// A request with default model, tone and type.
    pub fn new(raw_prompt: impl Into<String>) -> Result<Self, OptimizeError> {
        let raw_prompt = raw_prompt.into();
        if raw_prompt.trim().is_empty() {
            return Err(OptimizeError::EmptyPrompt);
        }
        Ok(Self {
            raw_prompt,
            model: Model::default(),
            tone: Tone::default(),
            prompt_type: PromptType::default(),
        })
    }

    /// Build from the strings a client sent. Absent options take their
    /// defaults; unknown ones are rejected.
    pub fn from_wire(
        prompt: Option<&str>,
        model: Option<&str>,
        tone: Option<&str>,
        prompt_type: Option<&str>,
    ) -> Result<Self, OptimizeError> {
        let mut request = Self::new(prompt.unwrap_or_default())?;
        request.model = resolve_option("model", model, Model::parse_str)?;
        request.tone = resolve_option("tone", tone, Tone::parse_str)?;
        request.prompt_type = resolve_option("type", prompt_type, PromptType::parse_str)?;
        Ok(request)
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_prompt_type(mut self, prompt_type: PromptType) -> Self {
        self.prompt_type = prompt_type;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_prompt: String,
    #[serde(rename = "model")]
    pub model_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    pub credit_source: CreditSource,
    /// Set when the result came from the local rewriter instead of the remote service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl OptimizationResult {
    /// Wrap the local rewriter's output for `raw_prompt`.
    pub fn local(raw_prompt: &str, warning: Option<String>) -> Self {
        Self {
            optimized_prompt: local::rewrite(raw_prompt),
            model_used: local::LOCAL_MODEL.to_string(),
            usage: None,
            credit_source: CreditSource::Local,
            warning,
        }
    }

    fn remote(completion: Completion, model: Model, source: CreditSource) -> Self {
        Self {
            optimized_prompt: completion.text,
            model_used: model.as_str().to_string(),
            usage: completion.usage,
            credit_source: source,
            warning: None,
        }
    }
}

/// Configuration and probe status of both credential slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReport {
    pub primary_key: SlotReport,
    pub secondary_key: SlotReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    pub configured: bool,
    pub status: String,
}

/// Stateless optimizer: every request starts again from the primary slot.
pub struct Optimizer {
    backend: Arc<dyn CompletionBackend>,
    credentials: Credentials,
    deadline: Duration,
}

impl Optimizer {
    pub fn new(backend: Arc<dyn CompletionBackend>, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Optimize through the completion service.
    ///
    /// Tries the primary slot when configured. A rate-limit, quota or network
    /// failure there is retried exactly once on the secondary slot, when one
    /// is configured. Every other outcome is returned as is.
    pub async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, OptimizeError> {
        if request.raw_prompt.trim().is_empty() {
            return Err(OptimizeError::EmptyPrompt);
        }

        let completion_request = CompletionRequest {
            model: request.model,
            system: build_system_instruction(request.tone, request.prompt_type),
            user: request.raw_prompt.clone(),
            deadline: self.deadline,
        };

        match (&self.credentials.primary, &self.credentials.secondary) {
            (None, None) => {
                warn!("optimize rejected: no completion credentials configured");
                Err(OptimizeError::NotConfigured)
            }
            (Some(primary), secondary) => {
                match self
                    .attempt(CreditSource::Primary, primary, &completion_request)
                    .await
                {
                    Err(e) if e.triggers_failover() => match secondary {
                        Some(secondary) => {
                            info!("primary key failed ({e}), switching to secondary key");
                            self.attempt(CreditSource::Secondary, secondary, &completion_request)
                                .await
                        }
                        None => Err(e),
                    },
                    other => other,
                }
            }
            (None, Some(secondary)) => {
                self.attempt(CreditSource::Secondary, secondary, &completion_request)
                    .await
            }
        }
    }

    /// Like [`Optimizer::optimize`], but substitutes the local rewriter for
    /// fallback-eligible failures and notes the cause in `warning`.
    pub async fn optimize_or_fallback(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, OptimizeError> {
        match self.optimize(request).await {
            Err(e) if e.is_fallback_eligible() => {
                let reason = e.fallback_reason();
                warn!("{reason}, using local optimization");
                Ok(OptimizationResult::local(
                    &request.raw_prompt,
                    Some(format!("Using local optimization ({reason})")),
                ))
            }
            other => other,
        }
    }

    /// Probe each configured slot against the provider.
    pub async fn probe_credentials(&self) -> CredentialReport {
        CredentialReport {
            primary_key: self.probe_slot(self.credentials.primary.as_ref()).await,
            secondary_key: self.probe_slot(self.credentials.secondary.as_ref()).await,
        }
    }

    async fn probe_slot(&self, credential: Option<&Credential>) -> SlotReport {
        let status = match credential {
            Some(c) => self.backend.probe(c).await,
            None => ProbeStatus::Unknown,
        };
        SlotReport {
            configured: credential.is_some(),
            status: status.label(),
        }
    }

    async fn attempt(
        &self,
        source: CreditSource,
        credential: &Credential,
        request: &CompletionRequest,
    ) -> Result<OptimizationResult, OptimizeError> {
        info!(
            backend = self.backend.name(),
            slot = source.as_str(),
            model = %request.model,
            "requesting completion"
        );
        match self.backend.complete(credential, request).await {
            Ok(completion) => Ok(OptimizationResult::remote(completion, request.model, source)),
            Err(e) => {
                warn!(slot = source.as_str(), status = e.http_status(), "completion failed: {e}");
                Err(e)
            }
        }
    }
}
