//! Free-text verdict classification.
//!
//! QA sheets are filled in by hand with no fixed vocabulary, so every cell is run
//! through an ordered series of pattern classes. The order is fixed and the first
//! class that matches wins:
//!
//! 1. blank (after whitespace normalization) -> `Invalid`
//! 2. not-available forms (`n/a`, `na`, `not applicable`, ...) -> `NotAvailable`
//! 3. pass patterns -> `Pass`
//! 4. fail patterns -> `Fail`
//! 5. anything else -> `Invalid`
//!
//! Word patterns are anchored on word boundaries so `passenger` never reads as `pass`.
//! Classification is total: every input maps to exactly one [`Classification`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::grid::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Pass,
    Fail,
    NotAvailable,
    /// Empty or unrecognized; excluded from every total.
    Invalid,
}

impl Classification {
    /// Pass, fail and not-available count toward the valid total.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::NotAvailable => write!(f, "not_available"),
            Self::Invalid => write!(f, "invalid"),
        }
    }
}

/// Classification plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub classification: Classification,
    pub rule: String,
}

const NOT_AVAILABLE_EXACT: &[&str] = &["n/a", "na", "n-a", "n a", "not available", "not applicable"];

const NOT_AVAILABLE_PATTERNS: &[&str] = &[
    r"\bn[/\-\s]?a\b",
    r"\bnot[\s\-_]?available\b",
    r"\bnot[\s\-_]?applicable\b",
];

const PASS_PATTERNS: &[&str] = &[
    r"\bpass(ed)?\b",
    r"\bsuccess(ful)?\b",
    r"\bok\b",
    r"\baccepted?\b",
    r"\bapproved?\b",
    r"\bcompleted?\b",
    r"\bvalid\b",
];

const PASS_GLYPHS: &[&str] = &["✓", "✔"];

const FAIL_PATTERNS: &[&str] = &[
    r"\bfail(ed|ure)?\b",
    r"\berror\b",
    r"\brejected?\b",
    r"\bblocked?\b",
    r"\binvalid\b",
    r"\bincomplete\b",
    r"\bpending\b",
    r"\bin progress\b",
    r"\bto ?do\b",
    r"\bnot (started|done|completed)\b",
];

const FAIL_GLYPHS: &[&str] = &["✗", "✘"];

struct PatternClass {
    classification: Classification,
    patterns: Vec<Regex>,
    glyphs: &'static [&'static str],
}

impl PatternClass {
    fn new(
        classification: Classification,
        patterns: &[&str],
        glyphs: &'static [&'static str],
    ) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
            .collect();
        Self { classification, patterns, glyphs }
    }

    fn find(&self, text: &str) -> Option<String> {
        if let Some(re) = self.patterns.iter().find(|re| re.is_match(text)) {
            // Strip the case-insensitivity prefix when reporting the rule.
            return Some(re.as_str().trim_start_matches("(?i)").to_string());
        }
        self.glyphs
            .iter()
            .find(|g| text.contains(**g))
            .map(|g| (*g).to_string())
    }
}

/// Pattern classes in precedence order.
static CLASSES: LazyLock<[PatternClass; 3]> = LazyLock::new(|| {
    [
        PatternClass::new(Classification::NotAvailable, NOT_AVAILABLE_PATTERNS, &[]),
        PatternClass::new(Classification::Pass, PASS_PATTERNS, PASS_GLYPHS),
        PatternClass::new(Classification::Fail, FAIL_PATTERNS, FAIL_GLYPHS),
    ]
});

/// Collapse internal whitespace runs (including line breaks) and trim.
fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify one raw cell text.
pub fn classify(raw: &str) -> Classification {
    explain(raw).classification
}

/// Classify one cell; numbers and booleans are classified by their display text.
pub fn classify_cell(cell: &CellValue) -> Classification {
    match cell {
        CellValue::Empty => Classification::Invalid,
        other => classify(&other.as_text()),
    }
}

/// Classify and report which rule fired.
pub fn explain(raw: &str) -> Match {
    let cleaned = normalize_whitespace(raw);
    if cleaned.is_empty() {
        return Match { classification: Classification::Invalid, rule: "empty".into() };
    }
    let lower = cleaned.to_lowercase();

    if NOT_AVAILABLE_EXACT.contains(&lower.as_str()) {
        return Match { classification: Classification::NotAvailable, rule: lower };
    }

    for class in CLASSES.iter() {
        if let Some(rule) = class.find(&lower) {
            return Match { classification: class.classification, rule };
        }
    }

    Match { classification: Classification::Invalid, rule: "unrecognized".into() }
}
