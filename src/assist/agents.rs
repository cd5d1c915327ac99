//! Role-specialized agents and the registry that maps roles to them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, Role};

use super::router::AgentRole;

/// Persona of one agent.
#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static [&'static str],
    pub expected_output: &'static str,
}

impl AgentProfile {
    /// Built-in persona for a role.
    pub fn for_role(role: AgentRole) -> Self {
        match role {
            AgentRole::Coach => Self {
                name: "AI Coach",
                description: "Coaching, next best actions, and execution guidance.",
                instructions: &[
                    "Deliver concise coaching and next best actions.",
                    "Ask clarifying questions when inputs are missing.",
                    "Suggest a short plan with clear steps.",
                    "Escalate regulatory questions to Compliance when needed.",
                ],
                expected_output: "Short, actionable guidance with clear next steps.",
            },
            AgentRole::Knowledge => Self {
                name: "Knowledge Manager",
                description: "Policies, product details, and market FAQs.",
                instructions: &[
                    "Answer with factual policy or product knowledge.",
                    "Call out uncertainty and request missing details.",
                    "Provide a brief summary first, then details.",
                ],
                expected_output: "Accurate knowledge response with sources or gaps noted.",
            },
            AgentRole::Operations => Self {
                name: "Operations Lead",
                description: "Workflow execution and coordination support.",
                instructions: &[
                    "Break tasks into clear phases and owners.",
                    "Surface dependencies, risks, and timing.",
                    "Offer a fast checklist to move forward.",
                ],
                expected_output: "Operational plan with dependencies and timeline hints.",
            },
            AgentRole::Compliance => Self {
                name: "Compliance Guardian",
                description: "Risk, regulation, and approval checks.",
                instructions: &[
                    "Identify compliance risks and required approvals.",
                    "Ask for jurisdiction, channel, and audience.",
                    "Be conservative; do not provide legal advice.",
                ],
                expected_output: "Risk assessment and recommended approvals or checks.",
            },
        }
    }

    /// System preamble describing the persona. Replies are plain text.
    pub fn preamble(&self) -> String {
        let mut text = format!("You are {}. {}\n\nInstructions:\n", self.name, self.description);
        for instruction in self.instructions {
            text.push_str("- ");
            text.push_str(instruction);
            text.push('\n');
        }
        text.push_str("\nExpected output: ");
        text.push_str(self.expected_output);
        text.push_str("\nDo not format replies as markdown.");
        text
    }
}

/// What a single agent run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub content: String,
    pub agent_name: String,
    pub model: String,
    pub provider: String,
    pub run_id: String,
}

/// An agent: a persona bound to a model provider.
pub struct Agent {
    role: AgentRole,
    profile: AgentProfile,
    llm: Arc<dyn LlmProvider>,
}

impl Agent {
    pub fn new(role: AgentRole, profile: AgentProfile, llm: Arc<dyn LlmProvider>) -> Self {
        Self { role, profile, llm }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn name(&self) -> &str {
        self.profile.name
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Merge the persona preamble into the leading system message so the
    /// provider always sees at most one system message.
    fn with_preamble(&self, mut messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let preamble = self.profile.preamble();
        match messages.first_mut() {
            Some(first) if first.role == Role::System => {
                first.content = format!("{preamble}\n\n{}", first.content);
            }
            _ => messages.insert(0, ChatMessage::system(preamble)),
        }
        messages
    }

    /// Run the agent once over a prepared message sequence.
    pub async fn run(
        &self,
        messages: Vec<ChatMessage>,
        session_id: Option<String>,
        user_id: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Result<RunOutput, LlmError> {
        let request = CompletionRequest::new(self.with_preamble(messages))
            .with_session(session_id)
            .with_user(user_id)
            .with_metadata(metadata);

        let response = self.llm.complete(request).await?;
        let run_id = response
            .response_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        info!(
            agent = self.profile.name,
            run_id = %run_id,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Agent run completed"
        );

        Ok(RunOutput {
            content: response.content,
            agent_name: self.profile.name.to_string(),
            model: self.llm.model_name().to_string(),
            provider: self.llm.provider_name().to_string(),
            run_id,
        })
    }
}

/// Immutable role → agent table, built once at startup.
pub struct AgentRegistry {
    coach: Arc<Agent>,
    knowledge: Arc<Agent>,
    operations: Arc<Agent>,
    compliance: Arc<Agent>,
}

impl AgentRegistry {
    /// Build every built-in agent on top of one shared provider.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        let build = |role| Arc::new(Agent::new(role, AgentProfile::for_role(role), Arc::clone(&llm)));
        Self {
            coach: build(AgentRole::Coach),
            knowledge: build(AgentRole::Knowledge),
            operations: build(AgentRole::Operations),
            compliance: build(AgentRole::Compliance),
        }
    }

    pub fn get(&self, role: AgentRole) -> Arc<Agent> {
        let agent = match role {
            AgentRole::Coach => &self.coach,
            AgentRole::Knowledge => &self.knowledge,
            AgentRole::Operations => &self.operations,
            AgentRole::Compliance => &self.compliance,
        };
        Arc::clone(agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Arc<Agent>> {
        [&self.coach, &self.knowledge, &self.operations, &self.compliance].into_iter()
    }
}
