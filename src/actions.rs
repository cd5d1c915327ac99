//! The `[ACTIONS]` block embedded in agent replies.
//!
//! An agent can ask the UI to do something by appending a block like:
//!
//! ```text
//! [ACTIONS]
//! OPEN_TAB: Knowledge Management
//! SET_LANGUAGE: vi
//! [/ACTIONS]
//! ```
//!
//! Only the first block is read. Lines that don't parse are skipped, never
//! reported as errors: the text comes from a model and is often imperfect.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::language::{Language, normalize_language};

static ACTIONS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[ACTIONS\](.*?)\[/ACTIONS\]").expect("actions block regex is valid")
});

/// A UI action requested by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    OpenTab { title: String },
    SetLanguage { language: Language },
}

/// Why a line inside the block produced no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    MissingColon,
    UnknownKey(String),
    EmptyTitle,
    UnrecognizedLanguage(String),
}

/// Outcome of scanning one line of the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Action(Action),
    Skipped(SkipReason),
}

/// Parse a single `KEY: value` line.
pub fn parse_line(raw: &str) -> LineOutcome {
    let line = raw.trim();
    if line.is_empty() {
        return LineOutcome::Skipped(SkipReason::Blank);
    }
    let Some((key, value)) = line.split_once(':') else {
        return LineOutcome::Skipped(SkipReason::MissingColon);
    };
    let key = key.trim().to_uppercase();
    let value = value.trim();

    match key.as_str() {
        "OPEN_TAB" if value.is_empty() => LineOutcome::Skipped(SkipReason::EmptyTitle),
        "OPEN_TAB" => LineOutcome::Action(Action::OpenTab {
            title: value.to_string(),
        }),
        "SET_LANGUAGE" => match normalize_language(value) {
            Some(language) => LineOutcome::Action(Action::SetLanguage { language }),
            None => LineOutcome::Skipped(SkipReason::UnrecognizedLanguage(value.to_string())),
        },
        _ => LineOutcome::Skipped(SkipReason::UnknownKey(key)),
    }
}

/// Characters that end a line inside a block, including bare `\r` and the
/// Unicode line and paragraph separators.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}',
    '\u{2029}',
];

/// Scan every line of a block body, yielding one outcome per line.
///
/// `\r\n` splits into a line and an empty remainder, which scans as blank.
pub fn scan_block(block: &str) -> impl Iterator<Item = LineOutcome> + '_ {
    block.split(LINE_BREAKS).map(parse_line)
}

/// Split a reply into its visible text and requested actions.
///
/// The first `[ACTIONS]...[/ACTIONS]` span (tags matched case-insensitively)
/// is removed and the remainder trimmed. Without a block the text is returned
/// unchanged with no actions.
pub fn extract_actions(text: &str) -> (String, Vec<Action>) {
    let Some(captures) = ACTIONS_BLOCK.captures(text) else {
        return (text.to_string(), Vec::new());
    };
    let (Some(span), Some(body)) = (captures.get(0), captures.get(1)) else {
        return (text.to_string(), Vec::new());
    };

    let mut actions = Vec::new();
    for outcome in scan_block(body.as_str()) {
        match outcome {
            LineOutcome::Action(action) => actions.push(action),
            LineOutcome::Skipped(SkipReason::Blank) => {}
            LineOutcome::Skipped(reason) => debug!(?reason, "Skipped action line"),
        }
    }

    let visible = format!("{}{}", &text[..span.start()], &text[span.end()..]);
    (visible.trim().to_string(), actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_tab_line_yields_action() {
        let (reply, actions) = extract_actions("Sure.\n[ACTIONS]\nOPEN_TAB: Research\n[/ACTIONS]");
        assert_eq!(reply, "Sure.");
        assert_eq!(
            actions,
            vec![Action::OpenTab {
                title: "Research".into()
            }]
        );
    }

    #[test]
    fn set_language_is_normalized() {
        let (_, actions) = extract_actions("[ACTIONS]\nSET_LANGUAGE: tieng viet\n[/ACTIONS]");
        assert_eq!(
            actions,
            vec![Action::SetLanguage {
                language: Language::Vietnamese
            }]
        );
    }

    #[test]
    fn unrecognized_language_is_dropped() {
        let (reply, actions) = extract_actions("Ok [ACTIONS]SET_LANGUAGE: Klingon[/ACTIONS]");
        assert_eq!(reply, "Ok");
        assert!(actions.is_empty());
    }

    #[test]
    fn no_block_returns_text_unchanged() {
        let text = "  Just a reply with OPEN_TAB: nothing  ";
        let (reply, actions) = extract_actions(text);
        assert_eq!(reply, text);
        assert!(actions.is_empty());
    }

    #[test]
    fn unterminated_block_is_not_a_block() {
        let text = "Reply\n[ACTIONS]\nOPEN_TAB: Research";
        let (reply, actions) = extract_actions(text);
        assert_eq!(reply, text);
        assert!(actions.is_empty());
    }

    #[test]
    fn tags_match_case_insensitively() {
        let (reply, actions) =
            extract_actions("Done.\n[actions]\nopen_tab: AI Coach\n[/Actions]\n");
        assert_eq!(reply, "Done.");
        assert_eq!(
            actions,
            vec![Action::OpenTab {
                title: "AI Coach".into()
            }]
        );
    }

    #[test]
    fn only_first_block_is_used() {
        let text = "A [ACTIONS]\nOPEN_TAB: One\n[/ACTIONS] B [ACTIONS]\nOPEN_TAB: Two\n[/ACTIONS]";
        let (reply, actions) = extract_actions(text);
        assert_eq!(reply, "A  B [ACTIONS]\nOPEN_TAB: Two\n[/ACTIONS]");
        assert_eq!(actions, vec![Action::OpenTab { title: "One".into() }]);
    }

    #[test]
    fn text_after_block_is_kept() {
        let (reply, _) = extract_actions("Before\n[ACTIONS]\nOPEN_TAB: X\n[/ACTIONS]\nAfter");
        assert_eq!(reply, "Before\n\nAfter");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = "[ACTIONS]\n\nnot an action\nFLY_AWAY: now\nOPEN_TAB:   \nOPEN_TAB: Others\nSET_LANGUAGE: zh-hant\n[/ACTIONS]";
        let (reply, actions) = extract_actions(text);
        assert_eq!(reply, "");
        assert_eq!(
            actions,
            vec![
                Action::OpenTab {
                    title: "Others".into()
                },
                Action::SetLanguage {
                    language: Language::TraditionalChinese
                },
            ]
        );
    }

    #[test]
    fn value_keeps_text_after_first_colon() {
        assert_eq!(
            parse_line("OPEN_TAB: Notes: Q3"),
            LineOutcome::Action(Action::OpenTab {
                title: "Notes: Q3".into()
            })
        );
    }

    #[test]
    fn scanner_reports_skip_reasons() {
        let outcomes: Vec<_> = scan_block("\nnope\nfoo: bar\nOPEN_TAB:\nSET_LANGUAGE: elvish").collect();
        assert_eq!(
            outcomes,
            vec![
                LineOutcome::Skipped(SkipReason::Blank),
                LineOutcome::Skipped(SkipReason::MissingColon),
                LineOutcome::Skipped(SkipReason::UnknownKey("FOO".into())),
                LineOutcome::Skipped(SkipReason::EmptyTitle),
                LineOutcome::Skipped(SkipReason::UnrecognizedLanguage("elvish".into())),
            ]
        );
    }

    #[test]
    fn carriage_return_only_lines_are_split() {
        let (reply, actions) =
            extract_actions("Ok\r[ACTIONS]\rOPEN_TAB: Research\rSET_LANGUAGE: vi\r[/ACTIONS]");
        assert_eq!(reply, "Ok");
        assert_eq!(
            actions,
            vec![
                Action::OpenTab {
                    title: "Research".into()
                },
                Action::SetLanguage {
                    language: Language::Vietnamese
                },
            ]
        );
    }

    #[test]
    fn unicode_line_separators_are_split() {
        for sep in ['\u{2028}', '\u{2029}', '\u{85}', '\u{0b}', '\u{0c}'] {
            let block = format!("OPEN_TAB: Research{sep}SET_LANGUAGE: vi");
            let actions: Vec<_> = scan_block(&block)
                .filter_map(|outcome| match outcome {
                    LineOutcome::Action(action) => Some(action),
                    LineOutcome::Skipped(_) => None,
                })
                .collect();
            assert_eq!(actions.len(), 2, "separator {sep:?}");
            assert_eq!(
                actions[0],
                Action::OpenTab {
                    title: "Research".into()
                }
            );
        }
    }

    #[test]
    fn crlf_lines_yield_blank_remainders() {
        let outcomes: Vec<_> = scan_block("OPEN_TAB: Research\r\nSET_LANGUAGE: en").collect();
        assert_eq!(
            outcomes,
            vec![
                LineOutcome::Action(Action::OpenTab {
                    title: "Research".into()
                }),
                LineOutcome::Skipped(SkipReason::Blank),
                LineOutcome::Action(Action::SetLanguage {
                    language: Language::English
                }),
            ]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let (reply, actions) =
            extract_actions("Here you go.\n[ACTIONS]\nOPEN_TAB: Research\n[/ACTIONS]");
        assert_eq!(actions.len(), 1);
        let (again, more) = extract_actions(&reply);
        assert_eq!(again, reply);
        assert!(more.is_empty());
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let open = serde_json::to_value(Action::OpenTab {
            title: "Research".into(),
        })
        .unwrap();
        assert_eq!(open, serde_json::json!({"type": "open_tab", "title": "Research"}));

        let lang = serde_json::to_value(Action::SetLanguage {
            language: Language::Vietnamese,
        })
        .unwrap();
        assert_eq!(lang, serde_json::json!({"type": "set_language", "language": "vi"}));
    }
}
