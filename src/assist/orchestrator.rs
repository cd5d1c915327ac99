//! Request orchestration: payload → messages → agent → reply + actions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::actions::{Action, extract_actions};
use crate::config::RunConfig;
use crate::error::{AssistError, ConfigError};
use crate::llm::{ChatMessage, LlmConfig, create_provider};

use super::agents::{Agent, AgentRegistry, RunOutput};
use super::context::{UiContext, build_system_context};
use super::history::{field_text, normalize_history, value_to_text};
use super::messages::build_messages;
use super::router::{RoutingHint, route};

/// Whether the agents could be built at startup.
pub enum AgentState {
    Ready(Arc<AgentRegistry>),
    /// Startup failed; every request fails with this detail.
    Unconfigured(String),
}

impl AgentState {
    /// Build the agents from the model configuration, capturing any failure.
    pub fn build(config: Result<LlmConfig, ConfigError>) -> Self {
        let provider = config
            .map_err(|e| e.to_string())
            .and_then(|config| create_provider(&config).map_err(|e| e.to_string()));
        match provider {
            Ok(llm) => AgentState::Ready(Arc::new(AgentRegistry::new(llm))),
            Err(detail) => {
                warn!(detail = %detail, "Model load failed; assist requests will be rejected");
                AgentState::Unconfigured(detail)
            }
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        match self {
            AgentState::Ready(_) => None,
            AgentState::Unconfigured(detail) => Some(detail),
        }
    }
}

/// Model identity reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub provider: String,
    pub id: String,
}

/// Validated input of one assist request.
#[derive(Debug, Clone)]
pub struct AssistRequest {
    pub prompt: String,
    pub ui: UiContext,
    /// Session id for the model run (the caller's tab id).
    pub tab_id: Option<String>,
    pub user_id: Option<String>,
    pub history: Vec<ChatMessage>,
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

impl AssistRequest {
    /// Read a request from its JSON payload.
    ///
    /// Only a blank prompt is rejected; every other field degrades to a
    /// default when missing or malformed.
    pub fn from_payload(payload: &Value) -> Result<Self, AssistError> {
        let Some(fields) = payload.as_object() else {
            return Err(AssistError::InvalidBody(
                "expected a JSON object".to_string(),
            ));
        };

        let prompt = field_text(fields.get("prompt")).trim().to_string();
        if prompt.is_empty() {
            return Err(AssistError::MissingPrompt);
        }

        let language = match field_text(fields.get("language")) {
            lang if lang.is_empty() => "en".to_string(),
            lang => lang.to_lowercase(),
        };
        let available_tabs = fields
            .get("tabs")
            .and_then(Value::as_array)
            .map(|tabs| tabs.iter().map(value_to_text).collect());

        Ok(Self {
            prompt,
            ui: UiContext {
                active_label: Some(field_text(fields.get("tab"))),
                active_kind: Some(field_text(fields.get("tabKind"))),
                language,
                available_tabs,
            },
            tab_id: non_empty(field_text(fields.get("tabId"))),
            user_id: non_empty(field_text(fields.get("userId"))),
            history: normalize_history(fields.get("messages").unwrap_or(&Value::Null)),
        })
    }

    pub fn routing_hint(&self) -> RoutingHint {
        RoutingHint::new(self.ui.label(), self.ui.kind())
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            ("tab".to_string(), self.ui.active_label.clone().unwrap_or_default()),
            ("tabKind".to_string(), self.ui.active_kind.clone().unwrap_or_default()),
            ("language".to_string(), self.ui.language.clone()),
        ])
    }
}

/// Successful assist response.
#[derive(Debug, Clone, Serialize)]
pub struct AssistReply {
    pub reply: String,
    pub actions: Vec<Action>,
    pub agent: String,
    pub model: String,
    pub provider: String,
    #[serde(rename = "runId")]
    pub run_id: String,
}

/// Composes the assist pipeline around the shared agent registry.
pub struct Orchestrator {
    agents: AgentState,
    model: ModelInfo,
    runs: Arc<Semaphore>,
    invoke_timeout: Duration,
}

impl Orchestrator {
    pub fn new(agents: AgentState, model: ModelInfo, config: &RunConfig) -> Self {
        Self {
            agents,
            model,
            runs: Arc::new(Semaphore::new(config.max_concurrent_runs.max(1))),
            invoke_timeout: config.invoke_timeout,
        }
    }

    pub fn model(&self) -> &ModelInfo {
        &self.model
    }

    pub fn load_error(&self) -> Option<&str> {
        self.agents.load_error()
    }

    fn registry(&self) -> Result<&Arc<AgentRegistry>, AssistError> {
        match &self.agents {
            AgentState::Ready(registry) => Ok(registry),
            AgentState::Unconfigured(detail) => Err(AssistError::Unconfigured(detail.clone())),
        }
    }

    /// Handle a raw request body. Configuration is checked before the body
    /// is even parsed.
    pub async fn handle_body(&self, body: &[u8]) -> Result<AssistReply, AssistError> {
        self.registry()?;
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| AssistError::InvalidBody(e.to_string()))?;
        self.handle(&payload).await
    }

    /// Handle a parsed JSON payload.
    pub async fn handle(&self, payload: &Value) -> Result<AssistReply, AssistError> {
        let registry = self.registry()?;
        let request = AssistRequest::from_payload(payload)?;
        self.run(registry, request).await
    }

    async fn run(
        &self,
        registry: &AgentRegistry,
        request: AssistRequest,
    ) -> Result<AssistReply, AssistError> {
        let system_context = build_system_context(&request.ui);
        let metadata = request.metadata();
        let role = route(&request.routing_hint());
        let agent = registry.get(role);

        info!(
            agent = agent.name(),
            role = %role,
            history = request.history.len(),
            language = %request.ui.language,
            "Dispatching assist request"
        );

        let messages = build_messages(&request.prompt, request.history, &system_context);
        let output = self
            .invoke(agent, messages, request.tab_id, request.user_id, metadata)
            .await?;

        let (reply, actions) = extract_actions(&output.content);
        Ok(AssistReply {
            reply,
            actions,
            agent: output.agent_name,
            model: output.model,
            provider: output.provider,
            run_id: output.run_id,
        })
    }

    /// Run the agent on the bounded pool, once, under the configured timeout.
    async fn invoke(
        &self,
        agent: Arc<Agent>,
        messages: Vec<ChatMessage>,
        session_id: Option<String>,
        user_id: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Result<RunOutput, AssistError> {
        let permit = Arc::clone(&self.runs)
            .acquire_owned()
            .await
            .map_err(|_| AssistError::Aborted("agent pool is shut down".to_string()))?;

        let task = tokio::spawn(async move {
            let _permit = permit;
            agent.run(messages, session_id, user_id, metadata).await
        });
        let abort = task.abort_handle();

        match tokio::time::timeout(self.invoke_timeout, task).await {
            Ok(Ok(Ok(output))) => Ok(output),
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Agent run failed");
                Err(AssistError::InvocationFailed(e))
            }
            Ok(Err(join_error)) => {
                warn!(error = %join_error, "Agent run task aborted");
                Err(AssistError::Aborted(join_error.to_string()))
            }
            Err(_) => {
                abort.abort();
                warn!(timeout = ?self.invoke_timeout, "Agent run timed out");
                Err(AssistError::Timeout(self.invoke_timeout))
            }
        }
    }
}
