//! Configuration types.
//!
//! Everything is read from the environment. A `.env` file can provide
//! defaults; variables already set in the process win.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

pub const DEFAULT_PORT: u16 = 7070;
pub const DEFAULT_MODEL_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

/// Load a `.env` file without overriding variables that are already set.
///
/// Returns `false` if the file doesn't exist or can't be parsed.
pub fn load_env_file(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match dotenvy::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable .env file");
            false
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Model settings as configured; validated by [`ModelSettings::llm_config`].
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Provider name, lower-cased.
    pub provider: String,
    pub model_id: String,
    pub api_key: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub openrouter_api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ModelSettings {
    /// Read settings through a variable lookup (the environment in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |name: &str| non_blank(get(name)).map(SecretString::from);
        Self {
            provider: non_blank(get("ASSIST_MODEL_PROVIDER"))
                .unwrap_or_else(|| DEFAULT_MODEL_PROVIDER.to_string())
                .trim()
                .to_lowercase(),
            model_id: non_blank(get("ASSIST_MODEL_ID"))
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            api_key: secret("ASSIST_MODEL_API_KEY"),
            openai_api_key: secret("OPENAI_API_KEY"),
            openrouter_api_key: secret("OPENROUTER_API_KEY"),
            base_url: non_blank(get("ASSIST_MODEL_BASE_URL")),
            temperature: non_blank(get("ASSIST_MODEL_TEMPERATURE"))
                .and_then(|s| s.trim().parse().ok()),
            max_tokens: non_blank(get("ASSIST_MODEL_MAX_TOKENS"))
                .and_then(|s| s.trim().parse().ok()),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the provider and its API key.
    ///
    /// The generic `ASSIST_MODEL_API_KEY` takes precedence over the
    /// provider-specific variable.
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let backend = LlmBackend::parse(&self.provider)
            .ok_or_else(|| ConfigError::UnsupportedProvider(self.provider.clone()))?;

        let (fallback_key, fallback_var) = match backend {
            LlmBackend::OpenAi => (&self.openai_api_key, "OPENAI_API_KEY"),
            LlmBackend::OpenRouter => (&self.openrouter_api_key, "OPENROUTER_API_KEY"),
        };
        let api_key = self
            .api_key
            .clone()
            .or_else(|| fallback_key.clone())
            .ok_or_else(|| ConfigError::MissingApiKey {
                vars: format!("{fallback_var} or ASSIST_MODEL_API_KEY"),
            })?;

        Ok(LlmConfig {
            backend,
            api_key,
            model: self.model_id.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

/// Limits for model invocations.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum agent runs in flight at once.
    pub max_concurrent_runs: usize,
    /// Upper bound on a single agent run.
    pub invoke_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 16,
            invoke_timeout: Duration::from_secs(120),
        }
    }
}

impl RunConfig {
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_concurrent_runs: usize =
            parse_or(get("ASSIST_MAX_CONCURRENT_RUNS"), defaults.max_concurrent_runs);
        let timeout_secs: u64 = parse_or(
            get("ASSIST_INVOKE_TIMEOUT_SECS"),
            defaults.invoke_timeout.as_secs(),
        );
        Self {
            max_concurrent_runs: max_concurrent_runs.max(1),
            invoke_timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub model: ModelSettings,
    pub runs: RunConfig,
}

impl ServiceConfig {
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or(get("ASSIST_PORT"), DEFAULT_PORT),
            model: ModelSettings::from_lookup(&get),
            runs: RunConfig::from_lookup(&get),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
