//! Prompt optimization: a chat-completion client with two credential slots,
//! the failover handler around it, and a rule-based local rewriter used when
//! the remote service cannot be reached.

pub mod client;
pub mod credentials;
pub mod error;
pub mod handler;
pub mod instruction;
pub mod local;
pub mod mock;

pub use client::{Completion, CompletionBackend, CompletionRequest, OpenRouterClient, ProbeStatus};
pub use credentials::{Credential, Credentials, CreditSource};
pub use error::OptimizeError;
pub use handler::{CredentialReport, OptimizationRequest, OptimizationResult, Optimizer};
