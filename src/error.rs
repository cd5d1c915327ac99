//! Error types for Agent Assist.

use std::time::Duration;

/// Top-level error type for the service.
///
/// Configuration and model failures never stop the server; they are carried
/// as [`AssistError::Unconfigured`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {vars}.")]
    MissingApiKey { vars: String },

    #[error("Unsupported model provider: {0}")]
    UnsupportedProvider(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Terminal failures of a single assist request.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    /// The agents could not be built at startup.
    #[error("Model load failed: {0}")]
    Unconfigured(String),

    #[error("Prompt is required.")]
    MissingPrompt,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Agent run failed: {0}")]
    InvocationFailed(#[from] LlmError),

    #[error("Agent run timed out after {0:?}")]
    Timeout(Duration),

    #[error("Agent run aborted: {0}")]
    Aborted(String),
}

impl AssistError {
    /// Human-readable detail carried in the `detail` field of error responses.
    pub fn detail(&self) -> String {
        match self {
            AssistError::Unconfigured(detail) => detail.clone(),
            AssistError::MissingPrompt => String::new(),
            AssistError::InvalidBody(detail) => detail.clone(),
            AssistError::InvocationFailed(e) => e.to_string(),
            AssistError::Timeout(timeout) => {
                format!("no reply within {}s", timeout.as_secs())
            }
            AssistError::Aborted(detail) => detail.clone(),
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
