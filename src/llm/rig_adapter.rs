//! Bridge from rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::completion::message::{AssistantContent, Message};
use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider_name: &'static str,
    temperature: Option<f64>,
    max_tokens: Option<u64>,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider_name: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider_name,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sampling settings applied to every request.
    pub fn with_defaults(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature.map(f64::from);
        self.max_tokens = max_tokens.map(u64::from);
        self
    }
}

/// Messages in rig's shape: system text goes to the preamble, the last turn
/// is the prompt and everything before it is chat history.
struct RigMessages {
    preamble: Option<String>,
    history: Vec<Message>,
    prompt: Message,
}

fn to_rig_messages(provider: &str, messages: Vec<ChatMessage>) -> Result<RigMessages, LlmError> {
    let mut system = Vec::new();
    let mut turns = Vec::new();
    for message in messages {
        match message.role {
            Role::System => system.push(message.content),
            Role::User => turns.push(Message::user(message.content)),
            Role::Assistant => turns.push(Message::assistant(message.content)),
        }
    }

    let prompt = turns.pop().ok_or_else(|| LlmError::RequestFailed {
        provider: provider.to_string(),
        reason: "no user or assistant message to send".to_string(),
    })?;

    Ok(RigMessages {
        preamble: (!system.is_empty()).then(|| system.join("\n\n")),
        history: turns,
        prompt,
    })
}

/// Provider request fields: the caller's metadata (plus the session id) and
/// the end-user id.
fn request_params(request: &CompletionRequest) -> Option<Value> {
    let mut metadata: Map<String, Value> = request
        .metadata
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    if let Some(ref session_id) = request.session_id {
        metadata.insert("session_id".to_string(), Value::String(session_id.clone()));
    }

    let mut params = Map::new();
    if !metadata.is_empty() {
        params.insert("metadata".to_string(), Value::Object(metadata));
    }
    if let Some(ref user_id) = request.user_id {
        params.insert("user".to_string(), Value::String(user_id.clone()));
    }
    (!params.is_empty()).then_some(Value::Object(params))
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn provider_name(&self) -> &str {
        self.provider_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let params = request_params(&request);
        let RigMessages {
            preamble,
            history,
            prompt,
        } = to_rig_messages(self.provider_name, request.messages)?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(params) = params {
            builder = builder.additional_params(params);
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.provider_name.to_string(),
            reason: e.to_string(),
        })?;

        let texts: Vec<&str> = response
            .choice
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect();
        if texts.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.provider_name.to_string(),
                reason: "completion contained no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content: texts.concat(),
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
            response_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    #[test]
    fn system_messages_become_the_preamble() {
        let rig = to_rig_messages(
            "openai",
            vec![
                ChatMessage::system("You are AI Coach."),
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi"),
                ChatMessage::system("Respond in English."),
                ChatMessage::user("next?"),
            ],
        )
        .unwrap();

        assert_eq!(
            rig.preamble.as_deref(),
            Some("You are AI Coach.\n\nRespond in English.")
        );
        assert_eq!(rig.history.len(), 2);
        assert!(matches!(rig.history[0], Message::User { .. }));
        assert!(matches!(rig.history[1], Message::Assistant { .. }));
        assert!(matches!(rig.prompt, Message::User { .. }));
    }

    #[test]
    fn no_turns_is_an_error() {
        let err = to_rig_messages("openai", vec![ChatMessage::system("only system")])
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::RequestFailed { .. }));
        assert!(to_rig_messages("openai", Vec::new()).is_err());
    }

    #[test]
    fn params_carry_metadata_session_and_user() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_session(Some("tab-7".into()))
            .with_user(Some("u-1".into()))
            .with_metadata(HashMap::from([("tabKind".to_string(), "build".to_string())]));

        assert_eq!(
            request_params(&request),
            Some(json!({
                "metadata": {"tabKind": "build", "session_id": "tab-7"},
                "user": "u-1"
            }))
        );
    }

    #[test]
    fn empty_request_sends_no_params() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);
        assert_eq!(request_params(&request), None);
    }
}
