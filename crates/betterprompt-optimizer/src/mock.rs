use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{Completion, CompletionBackend, CompletionRequest, ProbeStatus};
use crate::credentials::Credential;
use crate::error::OptimizeError;

/// A scripted completion backend for tests.
///
/// Each `complete` call pops the next scripted outcome and records which key
/// it was called with. An exhausted script answers with an upstream 500.
pub struct MockCompletion {
    script: Mutex<VecDeque<Result<Completion, OptimizeError>>>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    probe: ProbeStatus,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            probe: ProbeStatus::Working,
        }
    }

    /// Queue a successful completion with the given text.
    pub fn then_ok(self, text: &str) -> Self {
        self.push(Ok(Completion {
            text: text.to_string(),
            usage: None,
            latency_ms: 1,
        }))
    }

    /// Queue a failure.
    pub fn then_err(self, err: OptimizeError) -> Self {
        self.push(Err(err))
    }

    /// Status every probe reports.
    pub fn with_probe(mut self, status: ProbeStatus) -> Self {
        self.probe = status;
        self
    }

    /// Keys `complete` was called with, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(self, outcome: Result<Completion, OptimizeError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
        self
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        credential: &Credential,
        request: &CompletionRequest,
    ) -> Result<Completion, OptimizeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(credential.expose().to_string());
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(|| Err(OptimizeError::upstream(500, "mock script exhausted")))
    }

    async fn probe(&self, _credential: &Credential) -> ProbeStatus {
        self.probe
    }
}
