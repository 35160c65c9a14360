//! Inline diagnostics for editor text.
//!
//! Validators never modify the text. They return [`ValidationError`]s the
//! editor renders as underlines, tooltips and quick-fix menus. Malformed
//! values are errors; patterns that are still being typed are at most a
//! warning, and very short trailing fragments are left alone.

mod scan;
mod values;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::ValidationConfig;
use crate::core::{Clock, Priority, SystemClock, NAMED_COLORS, PRIORITY_ALIASES};
use crate::features::extract::{Boundary, DATE_PATTERN};

pub use scan::{find_duplicate_node_types, find_incomplete_patterns, find_unclosed_brackets};
pub use values::{validate_color, validate_date, validate_priority, DateConstraint};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Complete but invalid.
    Error,
    /// Suspicious or incomplete.
    Warning,
    /// A hint.
    Info,
    /// An optional improvement.
    Suggestion,
}

/// Byte range a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Start offset, inclusive.
    pub start: usize,
    /// End offset, exclusive.
    pub end: usize,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A one-click correction: replace the diagnostic's span with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickFix {
    /// Menu label.
    pub label: String,
    /// Text that replaces the span.
    pub replacement: String,
    /// Optional longer explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl QuickFix {
    /// A fix with a label and replacement.
    #[must_use]
    pub fn new(label: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    /// Single replacement for the span, when one is obvious.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quick_fixes: Vec<QuickFix>,
}

impl ValidationError {
    /// A diagnostic with no suggestion or fixes.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity,
            message: message.into(),
            span,
            suggestion: None,
            quick_fixes: Vec::new(),
        }
    }

    /// An error-severity diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, message, span)
    }

    /// A warning-severity diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, message, span)
    }

    /// An info-severity diagnostic.
    #[must_use]
    pub fn info(message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Info, message, span)
    }

    /// Set the single suggested replacement.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Append quick fixes.
    #[must_use]
    pub fn with_quick_fixes(mut self, fixes: impl IntoIterator<Item = QuickFix>) -> Self {
        self.quick_fixes.extend(fixes);
        self
    }
}

/// Keywords a `^date` value may be the start of.
pub(crate) const DATE_KEYWORDS: &[&str] = &[
    "today",
    "tomorrow",
    "yesterday",
    "next-week",
    "next-month",
    "eod",
    "eow",
    "eom",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

static DATE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DATE_PATTERN).unwrap_or_else(|e| panic!("Invalid date value regex: {e}"))
});

static PRIORITY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!([\p{L}\p{N}]+)").unwrap_or_else(|e| panic!("Invalid priority value regex: {e}"))
});

static COLOR_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:color|bg|border):(\S+)")
        .unwrap_or_else(|e| panic!("Invalid color value regex: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Date,
    Priority,
    Color,
}

impl ValueKind {
    fn is_keyword_prefix(self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        match self {
            Self::Date => DATE_KEYWORDS.iter().any(|k| k.starts_with(&fragment)),
            Self::Priority => {
                Priority::all().iter().any(|p| p.as_str().starts_with(&fragment))
                    || PRIORITY_ALIASES.iter().any(|(a, _)| a.starts_with(&fragment))
            },
            Self::Color => {
                is_hex_prefix(&fragment)
                    || NAMED_COLORS.iter().any(|(n, _)| n.starts_with(&fragment))
                    || COLOR_FUNCTIONS.iter().any(|f| {
                        f.starts_with(&fragment)
                            || (fragment.starts_with(f) && !fragment.contains(')'))
                    })
            },
        }
    }
}

const COLOR_FUNCTIONS: [&str; 4] = ["rgb(", "rgba(", "hsl(", "hsla("];

/// `#` followed by fewer hex digits than a full `#RRGGBB`.
fn is_hex_prefix(fragment: &str) -> bool {
    fragment
        .strip_prefix('#')
        .is_some_and(|digits| digits.len() < 6 && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Runs every check over a piece of text.
#[derive(Clone)]
pub struct Validator {
    config: ValidationConfig,
    clock: Arc<dyn Clock>,
    date_constraint: DateConstraint,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("date_constraint", &self.date_constraint)
            .finish_non_exhaustive()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl Validator {
    /// A validator using the system clock and no date constraint.
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            date_constraint: DateConstraint::Any,
        }
    }

    /// Use `clock` for relative dates.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Constrain every `^date` in the text.
    #[must_use]
    pub fn with_date_constraint(mut self, constraint: DateConstraint) -> Self {
        self.date_constraint = constraint;
        self
    }

    /// Every diagnostic for `text`, ordered by position.
    #[must_use]
    pub fn validate(&self, text: &str) -> Vec<ValidationError> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut errors = self.validate_values(text);
        errors.extend(find_incomplete_patterns(text, &self.config));
        errors.extend(find_duplicate_node_types(text));
        if text.trim().chars().count() >= self.config.min_input_length {
            errors.extend(find_unclosed_brackets(text));
        }

        errors.sort_by_key(|e| (e.span.start, e.severity));
        tracing::debug!(diagnostics = errors.len(), "validated input");
        errors
    }

    /// Validate the value of every `^date`, `!priority` and color directive.
    fn validate_values(&self, text: &str) -> Vec<ValidationError> {
        let now = self.clock.now();
        let mut errors = Vec::new();

        for (regex, kind) in [
            (&*DATE_VALUE, ValueKind::Date),
            (&*PRIORITY_VALUE, ValueKind::Priority),
            (&*COLOR_VALUE, ValueKind::Color),
        ] {
            for caps in regex.captures_iter(text) {
                let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if !Self::starts_at_boundary(text, whole.start(), kind) {
                    continue;
                }
                if self.is_still_typing(text, value.end(), value.as_str(), kind) {
                    continue;
                }

                let span = Span::new(value.start(), value.end());
                let error = match kind {
                    ValueKind::Date => validate_date(value.as_str(), &self.date_constraint, span, now),
                    ValueKind::Priority => validate_priority(value.as_str(), span),
                    ValueKind::Color => validate_color(value.as_str(), span),
                };
                errors.extend(error);
            }
        }

        errors
    }

    fn starts_at_boundary(text: &str, start: usize, kind: ValueKind) -> bool {
        let boundary = match kind {
            ValueKind::Date | ValueKind::Priority => Boundary::Sigil,
            ValueKind::Color => Boundary::Word,
        };
        boundary.allows(text[..start].chars().next_back())
    }

    /// A value that runs to the end of the text and is either very short or
    /// the start of a known keyword is still being typed.
    fn is_still_typing(&self, text: &str, value_end: usize, value: &str, kind: ValueKind) -> bool {
        if value_end != text.len() {
            return false;
        }
        value.chars().count() <= self.config.trailing_fragment_length
            || kind.is_keyword_prefix(value)
    }
}

/// Validate `text` with the default configuration and system clock.
///
/// ```
/// use nodesyntax::features::validate::{validate_input, Severity};
///
/// assert!(validate_input("@2").is_empty());
/// assert!(validate_input("Lunch ^today").is_empty());
///
/// let errors = validate_input("Paint it color:#ggg now");
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].severity, Severity::Error);
/// ```
#[must_use]
pub fn validate_input(text: &str) -> Vec<ValidationError> {
    Validator::default().validate(text)
}
