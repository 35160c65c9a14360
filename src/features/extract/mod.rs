//! Inline pattern extraction.
//!
//! Turns editor text like `"Review PR ^tomorrow !!! #urgent color:#ff0000"`
//! into clean text plus structured patterns and metadata:
//! - `^date`, `!priority`, `#tag`, `@assignee`, `$nodeType`
//! - `[[reference]]`, `[ ]` / `[x]` checkboxes, `**bold**`, `*italic*`
//! - `keyword:value` directives (`color:`, `bg:`, `size:`, `title:"…"`, ...)
//! - `:status`

mod extractor;
mod rules;

use serde::Serialize;
use serde_json::{Map, Value};

pub use extractor::{extract_all, Extractor};
pub use rules::PatternType;
pub(crate) use rules::{Boundary, DATE_PATTERN};

/// One recognized piece of inline syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    /// What kind of syntax this is.
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    /// The exact matched text, sigils and delimiters included.
    pub raw_text: String,
    /// Byte offset of `raw_text` in the input.
    pub position: usize,
    /// Normalized value (`"high"`, `"#ff0000"`, `"2024-03-15"`).
    pub value: String,
    /// Human-presentable rendering (`"🔴 High"`, `"#FF0000"`, `"Tomorrow"`).
    pub display: String,
}

impl PatternMatch {
    /// Byte offset one past the end of the match.
    #[must_use]
    pub fn end(&self) -> usize {
        self.position + self.raw_text.len()
    }
}

/// Output of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Input with every matched span removed and whitespace collapsed.
    pub clean_text: String,
    /// Matches in scan order.
    pub patterns: Vec<PatternMatch>,
    /// Metadata written by the matched rules.
    pub metadata: Map<String, Value>,
}

impl ExtractionResult {
    /// Matches of one type, in scan order.
    pub fn of_type(&self, pattern_type: PatternType) -> impl Iterator<Item = &PatternMatch> {
        self.patterns
            .iter()
            .filter(move |p| p.pattern_type == pattern_type)
    }

    /// The first match of a type.
    #[must_use]
    pub fn first(&self, pattern_type: PatternType) -> Option<&PatternMatch> {
        self.of_type(pattern_type).next()
    }

    /// Tags in order of appearance.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.of_type(PatternType::Tag)
            .map(|p| p.value.as_str())
            .collect()
    }

    /// Look up a metadata value by dotted path (`responseFormat.type`).
    #[must_use]
    pub fn metadata_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.metadata.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }
}
