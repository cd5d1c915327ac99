//! The assist pipeline.
//!
//! A request flows through history normalization and context composition,
//! is assembled into one message sequence, routed to a role-specialized
//! agent, and the agent's reply is split into visible text and UI actions.

pub mod agents;
pub mod context;
pub mod history;
pub mod messages;
pub mod orchestrator;
pub mod router;

pub use agents::{Agent, AgentProfile, AgentRegistry, RunOutput};
pub use context::{UiContext, build_system_context};
pub use history::{MAX_HISTORY, normalize_history};
pub use messages::build_messages;
pub use orchestrator::{AgentState, AssistReply, AssistRequest, ModelInfo, Orchestrator};
pub use router::{AgentRole, RoutingHint, route};
