//! System context composed from the caller's UI state.

use crate::language::language_label;

/// Destinations offered when the caller doesn't list its own tabs.
pub const DEFAULT_TABS: &[&str] = &["AI Coach", "Knowledge Management", "Others"];

const STANDING_INSTRUCTIONS: &[&str] = &[
    "Keep responses concise and action oriented.",
    "If the user requests a language change, always include SET_LANGUAGE.",
    "If you want the UI to perform an action, append a block like:\n\
     [ACTIONS]\nOPEN_TAB: <title>\nSET_LANGUAGE: <en|vi|zh-hant>\n[/ACTIONS]",
];

/// Per-request UI state sent by the caller.
#[derive(Debug, Clone, Default)]
pub struct UiContext {
    /// Title of the active tab ("lane").
    pub active_label: Option<String>,
    /// Kind of the active tab (strategy, research, ...).
    pub active_kind: Option<String>,
    /// Requested reply language code, lower-cased.
    pub language: String,
    /// Tabs the UI can open, in display order.
    pub available_tabs: Option<Vec<String>>,
}

impl UiContext {
    pub fn label(&self) -> &str {
        self.active_label.as_deref().unwrap_or_default().trim()
    }

    pub fn kind(&self) -> &str {
        self.active_kind.as_deref().unwrap_or_default().trim()
    }
}

/// Build the single system instruction for a request.
pub fn build_system_context(ui: &UiContext) -> String {
    let mut parts: Vec<String> = Vec::new();

    let (lane, kind) = (ui.label(), ui.kind());
    if !lane.is_empty() || !kind.is_empty() {
        let lane = if lane.is_empty() { "Workspace" } else { lane };
        let kind = if kind.is_empty() { "general" } else { kind };
        parts.push(format!("Active lane: {lane} ({kind})."));
    }

    if let Some(label) = language_label(&ui.language) {
        parts.push(format!("Respond in {label}."));
    }

    match ui.available_tabs.as_deref() {
        Some(tabs) if !tabs.is_empty() => {
            parts.push(format!(
                "Available tabs: {}. Use only these for OPEN_TAB.",
                tabs.join(", ")
            ));
        }
        _ => {
            parts.push(format!("Available tabs: {}.", DEFAULT_TABS.join(", ")));
            parts.push("Use only these for OPEN_TAB.".to_string());
        }
    }

    parts.extend(STANDING_INSTRUCTIONS.iter().map(|s| s.to_string()));
    parts.join(" ").trim().to_string()
}
