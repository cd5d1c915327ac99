//! LLM integration for Agent Assist.
//!
//! Supports:
//! - **OpenAI**: Direct API access via rig-core
//! - **OpenRouter**: Routed API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::LlmError;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAi,
    OpenRouter,
}

impl LlmBackend {
    /// Parse a provider name as written in configuration (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(LlmBackend::OpenAi),
            "openrouter" => Some(LlmBackend::OpenRouter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackend::OpenAi => "openai",
            LlmBackend::OpenRouter => "openrouter",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            LlmBackend::OpenAi => OPENAI_API_BASE,
            LlmBackend::OpenRouter => OPENROUTER_API_BASE,
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Overrides the backend's default API base.
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmConfig {
    fn api_base(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.backend.default_api_base())
    }

    fn client_error(&self, e: impl std::fmt::Display) -> LlmError {
        LlmError::RequestFailed {
            provider: self.backend.as_str().to_string(),
            reason: format!("Failed to create {} client: {}", self.backend.as_str(), e),
        }
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::OpenAi => create_openai_provider(config),
        LlmBackend::OpenRouter => create_openrouter_provider(config),
    }
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> = openai::Client::builder()
        .api_key(config.api_key.expose_secret())
        .base_url(config.api_base())
        .build()
        .map_err(|e| config.client_error(e))?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {}, base: {})", config.model, config.api_base());
    Ok(Arc::new(
        RigAdapter::new(model, &config.model, "openai")
            .with_defaults(config.temperature, config.max_tokens),
    ))
}

fn create_openrouter_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openrouter;

    let client: rig::client::Client<openrouter::client::OpenRouterExt> =
        openrouter::Client::builder()
            .api_key(config.api_key.expose_secret())
            .base_url(config.api_base())
            .build()
            .map_err(|e| config.client_error(e))?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenRouter (model: {}, base: {})", config.model, config.api_base());
    Ok(Arc::new(
        RigAdapter::new(model, &config.model, "openrouter")
            .with_defaults(config.temperature, config.max_tokens),
    ))
}
