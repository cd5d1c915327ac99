//! Language hint normalization.
//!
//! Free-form hints ("vi", "Tiếng Việt", "Traditional Chinese", "繁體中文")
//! are folded to one of the supported UI languages. Rules are plain data and
//! evaluated in order; the first matching rule wins.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Languages the UI can switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "zh-hant")]
    TraditionalChinese,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Vietnamese => "vi",
            Language::TraditionalChinese => "zh-hant",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One recognition rule.
///
/// `prefixes` and `fragments` are tested against the lower-cased text with
/// diacritics removed; `native` against the lower-cased text as written.
#[derive(Debug, Clone, Copy)]
pub struct LanguageRule {
    pub language: Language,
    pub prefixes: &'static [&'static str],
    pub fragments: &'static [&'static str],
    pub native: &'static [&'static str],
}

impl LanguageRule {
    fn matches(&self, lowered: &str, plain: &str) -> bool {
        self.prefixes.iter().any(|p| plain.starts_with(p))
            || self.fragments.iter().any(|f| plain.contains(f))
            || self.native.iter().any(|n| lowered.contains(n))
    }
}

/// Recognition rules in priority order.
pub const LANGUAGE_RULES: &[LanguageRule] = &[
    LanguageRule {
        language: Language::English,
        prefixes: &["en"],
        fragments: &["english", "tieng anh"],
        native: &[],
    },
    LanguageRule {
        language: Language::Vietnamese,
        prefixes: &["vi"],
        fragments: &["vietnam", "tieng viet"],
        native: &[],
    },
    LanguageRule {
        language: Language::TraditionalChinese,
        prefixes: &["zh"],
        fragments: &[
            "zh-hant",
            "traditional chinese",
            "trad chinese",
            "tieng trung",
            "tieng hoa",
            "chinese",
        ],
        native: &["繁體", "繁体", "繁中", "中文"],
    },
];

/// Display names for language codes the reply can be requested in.
const LANGUAGE_LABELS: &[(&str, &str)] = &[
    ("en", "English"),
    ("vi", "Vietnamese"),
    ("zh-hant", "Traditional Chinese"),
    ("es", "Spanish"),
    ("de", "German"),
];

/// Strip nonspacing marks after NFD decomposition. Spacing and enclosing
/// marks are kept.
pub fn fold_diacritics(value: &str) -> String {
    value
        .nfd()
        .filter(|c| c.general_category() != GeneralCategory::NonspacingMark)
        .collect()
}

/// Map a free-form language hint to a supported language.
///
/// Returns `None` when no rule matches; never fails.
pub fn normalize_language(value: &str) -> Option<Language> {
    let lowered = value.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let plain = fold_diacritics(&lowered);

    LANGUAGE_RULES
        .iter()
        .find(|rule| rule.matches(&lowered, &plain))
        .map(|rule| rule.language)
}

/// Display name for an exact language code, e.g. `"vi"` → `"Vietnamese"`.
pub fn language_label(code: &str) -> Option<&'static str> {
    LANGUAGE_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}
