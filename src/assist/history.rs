//! Conversation history sanitization.
//!
//! The caller sends the whole conversation on every request, as untyped JSON.
//! Anything that doesn't look like a message is dropped silently.

use serde_json::Value;

use crate::llm::{ChatMessage, Role};

/// Only the most recent entries are forwarded to the agent.
pub const MAX_HISTORY: usize = 20;

/// Render a JSON value as text: strings verbatim, everything else as JSON.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of an optional field, treating falsy JSON (null, false, 0, "", [], {})
/// as empty.
pub(crate) fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::Array(items)) if items.is_empty() => String::new(),
        Some(Value::Object(map)) if map.is_empty() => String::new(),
        Some(other) => value_to_text(other),
    }
}

fn parse_role(raw: &str) -> Role {
    match raw {
        "system" => Role::System,
        "assistant" => Role::Assistant,
        _ => Role::User,
    }
}

fn normalize_entry(entry: &Value) -> Option<ChatMessage> {
    let record = entry.as_object()?;

    let role = field_text(record.get("role")).trim().to_lowercase();
    if role.is_empty() {
        return None;
    }

    let content = match record.get("content") {
        Some(Value::Null) | None => record.get("text"),
        present => present,
    };
    let content = match content {
        Some(Value::Null) | None => return None,
        Some(value) => value_to_text(value),
    };

    Some(ChatMessage::new(parse_role(&role), content))
}

/// Normalize a raw conversation log into at most [`MAX_HISTORY`] messages.
///
/// A non-array value yields an empty history. Truncation drops the oldest
/// entries before filtering, so malformed entries still count toward the cap.
pub fn normalize_history(messages: &Value) -> Vec<ChatMessage> {
    let Some(entries) = messages.as_array() else {
        return Vec::new();
    };
    let start = entries.len().saturating_sub(MAX_HISTORY);
    entries[start..].iter().filter_map(normalize_entry).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_last_twenty_in_order() {
        let entries: Vec<Value> = (0..25)
            .map(|i| {
                let role = if i % 2 == 0 { "user" } else { "assistant" };
                json!({"role": role, "content": format!("m{i}")})
            })
            .collect();
        let history = normalize_history(&Value::Array(entries));
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].content, "m5");
        assert_eq!(history[19].content, "m24");
        assert_eq!(history[0].role, Role::Assistant);
    }

    #[test]
    fn unknown_role_becomes_user() {
        let history = normalize_history(&json!([{"role": "bot", "content": "hi"}]));
        assert_eq!(history, vec![ChatMessage::user("hi")]);
    }

    #[test]
    fn role_is_trimmed_and_lowercased() {
        let history = normalize_history(&json!([
            {"role": "  Assistant ", "content": "a"},
            {"role": "SYSTEM", "content": "s"}
        ]));
        assert_eq!(
            history,
            vec![ChatMessage::assistant("a"), ChatMessage::system("s")]
        );
    }

    #[test]
    fn non_array_yields_empty() {
        assert!(normalize_history(&json!(42)).is_empty());
        assert!(normalize_history(&json!({"role": "user", "content": "x"})).is_empty());
        assert!(normalize_history(&Value::Null).is_empty());
        assert!(normalize_history(&json!("hello")).is_empty());
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let history = normalize_history(&json!([
            "just a string",
            7,
            {"content": "no role"},
            {"role": "", "content": "empty role"},
            {"role": "   ", "content": "blank role"},
            {"role": "user"},
            {"role": "user", "content": null},
            {"role": "user", "content": "kept"}
        ]));
        assert_eq!(history, vec![ChatMessage::user("kept")]);
    }

    #[test]
    fn text_field_is_used_when_content_missing() {
        let history = normalize_history(&json!([
            {"role": "assistant", "text": "from text"},
            {"role": "user", "content": null, "text": "null content falls back"}
        ]));
        assert_eq!(
            history,
            vec![
                ChatMessage::assistant("from text"),
                ChatMessage::user("null content falls back")
            ]
        );
    }

    #[test]
    fn content_is_coerced_to_text() {
        let history = normalize_history(&json!([
            {"role": "user", "content": 12},
            {"role": "user", "content": ""},
            {"role": "user", "content": {"k": "v"}}
        ]));
        assert_eq!(history[0].content, "12");
        assert_eq!(history[1].content, "");
        assert_eq!(history[2].content, r#"{"k":"v"}"#);
    }

    #[test]
    fn cap_applies_before_filtering() {
        let mut entries: Vec<Value> = vec![json!({"role": "user", "content": "old"})];
        entries.extend((0..20).map(|_| json!("junk")));
        assert!(normalize_history(&Value::Array(entries)).is_empty());
    }

    #[test]
    fn field_text_treats_falsy_as_empty() {
        assert_eq!(field_text(None), "");
        assert_eq!(field_text(Some(&json!(false))), "");
        assert_eq!(field_text(Some(&json!(0))), "");
        assert_eq!(field_text(Some(&json!([]))), "");
        assert_eq!(field_text(Some(&json!("tab"))), "tab");
        assert_eq!(field_text(Some(&json!(3))), "3");
    }
}
