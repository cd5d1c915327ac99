//! Final message sequence sent to the agent.

use crate::llm::{ChatMessage, Role};

/// Assemble `[system context] + history + prompt`.
///
/// The prompt is not appended again when the history already ends with an
/// identical user message (exact string equality).
pub fn build_messages(
    prompt: &str,
    history: Vec<ChatMessage>,
    system_context: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if !system_context.is_empty() {
        messages.push(ChatMessage::system(system_context));
    }
    messages.extend(history);

    let already_sent = messages
        .last()
        .is_some_and(|last| last.role == Role::User && last.content == prompt);
    if !already_sent {
        messages.push(ChatMessage::user(prompt));
    }
    messages
}
