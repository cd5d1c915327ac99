//! Agent selection from UI hints.

use serde::Serialize;

/// The role-specialized agents a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Coach,
    Knowledge,
    Operations,
    Compliance,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::Coach,
        AgentRole::Knowledge,
        AgentRole::Operations,
        AgentRole::Compliance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Coach => "coach",
            AgentRole::Knowledge => "knowledge",
            AgentRole::Operations => "operations",
            AgentRole::Compliance => "compliance",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substrings of the tab title, checked in order.
const TITLE_RULES: &[(&[&str], AgentRole)] = &[
    (&["coach", "strategy"], AgentRole::Coach),
    (&["knowledge", "research"], AgentRole::Knowledge),
    (&["compliance", "audit", "risk"], AgentRole::Compliance),
];

/// Exact tab kinds.
const KIND_TO_ROLE: &[(&str, AgentRole)] = &[
    ("strategy", AgentRole::Coach),
    ("research", AgentRole::Knowledge),
    ("build", AgentRole::Operations),
    ("monitor", AgentRole::Compliance),
];

/// UI hints used for routing.
#[derive(Debug, Clone, Default)]
pub struct RoutingHint {
    pub title_hint: String,
    pub kind_hint: String,
}

impl RoutingHint {
    pub fn new(title_hint: impl Into<String>, kind_hint: impl Into<String>) -> Self {
        Self {
            title_hint: title_hint.into(),
            kind_hint: kind_hint.into(),
        }
    }
}

/// Pick the agent role for a request.
///
/// Title substrings win over the kind; anything unmatched goes to the coach.
pub fn route(hint: &RoutingHint) -> AgentRole {
    let title = hint.title_hint.trim().to_lowercase();
    let kind = hint.kind_hint.trim().to_lowercase();

    TITLE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| title.contains(n)))
        .map(|(_, role)| *role)
        .or_else(|| {
            KIND_TO_ROLE
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, role)| *role)
        })
        .unwrap_or(AgentRole::Coach)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_title_then_kind() {
        let cases = [
            ("Strategy Review", "", AgentRole::Coach),
            ("AI Coach", "build", AgentRole::Coach),
            ("Knowledge Base FAQ", "", AgentRole::Knowledge),
            ("Market research", "monitor", AgentRole::Knowledge),
            ("Risk Register", "", AgentRole::Compliance),
            ("Q3 AUDIT", "strategy", AgentRole::Compliance),
            ("", "monitor", AgentRole::Compliance),
            ("", "build", AgentRole::Operations),
            ("Pipeline", " Research ", AgentRole::Knowledge),
            ("", "strategy", AgentRole::Coach),
            ("", "unknown", AgentRole::Coach),
            ("", "", AgentRole::Coach),
        ];
        for (title, kind, expected) in cases {
            assert_eq!(
                route(&RoutingHint::new(title, kind)),
                expected,
                "title={title:?} kind={kind:?}"
            );
        }
    }

    #[test]
    fn title_precedence_follows_rule_order() {
        // Contains both a knowledge and a compliance marker.
        assert_eq!(
            route(&RoutingHint::new("Research risk", "")),
            AgentRole::Knowledge
        );
        // Coach markers beat everything.
        assert_eq!(
            route(&RoutingHint::new("Compliance coaching", "research")),
            AgentRole::Coach
        );
    }

    #[test]
    fn kind_must_match_exactly() {
        assert_eq!(
            route(&RoutingHint::new("", "monitoring")),
            AgentRole::Coach
        );
    }

    #[test]
    fn role_names() {
        let names: Vec<_> = AgentRole::ALL.iter().map(|r| r.to_string()).collect();
        assert_eq!(names, ["coach", "knowledge", "operations", "compliance"]);
    }
}
