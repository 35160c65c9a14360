//! The ordered pattern table.
//!
//! Each rule pairs a regex with the pattern type it produces, the metadata
//! key it writes and a value extractor. Rules are tried in table order and a
//! later rule never claims text an earlier rule already matched.
//!
//! `keyword:` rules (`color:`, `title:`, ...) form an exclusivity group. The
//! status rule (`:done`) excludes every keyword in that group, and the list
//! is derived from the table so new keyword rules are excluded automatically.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::{
    date_to_iso, format_date_for_display, format_color_for_display, normalize_priority,
    parse_color, parse_date_string_at, Priority,
};

/// Kind of inline syntax a [`super::PatternMatch`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternType {
    Date,
    Priority,
    Color,
    BackgroundColor,
    BorderColor,
    Tag,
    Assignee,
    Reference,
    FontSize,
    FontWeight,
    FontStyle,
    TextAlign,
    Title,
    Label,
    Url,
    Language,
    FileName,
    Confidence,
    Status,
    Checkbox,
    Bold,
    Italic,
    Question,
    Multiple,
    Options,
    NodeType,
}

impl PatternType {
    /// camelCase name, as serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Priority => "priority",
            Self::Color => "color",
            Self::BackgroundColor => "backgroundColor",
            Self::BorderColor => "borderColor",
            Self::Tag => "tag",
            Self::Assignee => "assignee",
            Self::Reference => "reference",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::FontStyle => "fontStyle",
            Self::TextAlign => "textAlign",
            Self::Title => "title",
            Self::Label => "label",
            Self::Url => "url",
            Self::Language => "language",
            Self::FileName => "fileName",
            Self::Confidence => "confidence",
            Self::Status => "status",
            Self::Checkbox => "checkbox",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Question => "question",
            Self::Multiple => "multiple",
            Self::Options => "options",
            Self::NodeType => "nodeType",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What may sit directly before a match, or after it for `followed_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// Anything.
    Any,
    /// Start of input, whitespace or an opening bracket/quote (`#tag`, `@sam`).
    Sigil,
    /// Start of input or a non-word character (`color:red`).
    Word,
}

impl Boundary {
    pub(crate) fn allows(self, previous: Option<char>) -> bool {
        match (self, previous) {
            (Self::Any, _) | (_, None) => true,
            (Self::Sigil, Some(c)) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '"' | '\''),
            (Self::Word, Some(c)) => !(c.is_alphanumeric() || c == '_'),
        }
    }
}

/// Mutual-exclusion role of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exclusivity {
    /// Unconstrained.
    Free,
    /// A `keyword:` rule.
    Keyword,
    /// Rejected when directly preceded by any keyword of the group.
    ExcludesKeywords,
}

/// How a rule's value lands in the metadata map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetadataMode {
    /// Last write wins.
    Replace,
    /// Values accumulate into an array.
    Append,
    /// First write wins.
    KeepFirst,
}

/// Normalized output of a rule for one match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Extracted {
    pub value: String,
    pub display: String,
    /// Metadata value when it is not simply `value` as a string.
    pub metadata: Option<Value>,
}

impl Extracted {
    fn text(value: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: display.into(),
            metadata: None,
        }
    }

    fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::text(value.clone(), value)
    }

    fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Time reference for rules that resolve relative values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleContext {
    pub now: NaiveDateTime,
}

impl RuleContext {
    pub(crate) fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

type ExtractFn = fn(&Captures<'_>, &RuleContext) -> Option<Extracted>;

pub(crate) struct Rule {
    pub pattern_type: PatternType,
    /// The `keyword` of a `keyword:value` rule.
    pub keyword: Option<&'static str>,
    pub regex: Regex,
    pub boundary: Boundary,
    /// What may follow the last character of a match.
    pub followed_by: Boundary,
    pub exclusivity: Exclusivity,
    pub metadata_key: &'static str,
    pub metadata_mode: MetadataMode,
    pub extract: ExtractFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("pattern_type", &self.pattern_type)
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

struct RuleSpec {
    pattern_type: PatternType,
    keyword: Option<&'static str>,
    /// Regex after the `keyword:` prefix, or the whole regex otherwise.
    pattern: String,
    boundary: Boundary,
    followed_by: Boundary,
    exclusivity: Exclusivity,
    metadata_key: &'static str,
    metadata_mode: MetadataMode,
    extract: ExtractFn,
}

impl RuleSpec {
    fn new(
        pattern_type: PatternType,
        pattern: impl Into<String>,
        metadata_key: &'static str,
        extract: ExtractFn,
    ) -> Self {
        Self {
            pattern_type,
            keyword: None,
            pattern: pattern.into(),
            boundary: Boundary::Sigil,
            followed_by: Boundary::Any,
            exclusivity: Exclusivity::Free,
            metadata_key,
            metadata_mode: MetadataMode::Replace,
            extract,
        }
    }

    fn keyword(
        pattern_type: PatternType,
        keyword: &'static str,
        pattern: &str,
        metadata_key: &'static str,
        extract: ExtractFn,
    ) -> Self {
        Self {
            keyword: Some(keyword),
            boundary: Boundary::Word,
            exclusivity: Exclusivity::Keyword,
            ..Self::new(pattern_type, pattern, metadata_key, extract)
        }
    }

    fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    fn followed_by(mut self, boundary: Boundary) -> Self {
        self.followed_by = boundary;
        self
    }

    fn exclusivity(mut self, exclusivity: Exclusivity) -> Self {
        self.exclusivity = exclusivity;
        self
    }

    fn mode(mut self, mode: MetadataMode) -> Self {
        self.metadata_mode = mode;
        self
    }

    fn compile(self) -> Rule {
        let source = match self.keyword {
            Some(keyword) => format!("(?i:{keyword}):{}", self.pattern),
            None => self.pattern,
        };
        let regex = Regex::new(&source).unwrap_or_else(|e| {
            panic!("Invalid {} rule regex: {e}", self.pattern_type.as_str())
        });

        Rule {
            pattern_type: self.pattern_type,
            keyword: self.keyword,
            regex,
            boundary: self.boundary,
            followed_by: self.followed_by,
            exclusivity: self.exclusivity,
            metadata_key: self.metadata_key,
            metadata_mode: self.metadata_mode,
            extract: self.extract,
        }
    }
}

/// Identifier grammar shared by tags, mentions, node types and statuses.
const IDENT: &str = r"[\p{L}][\p{L}\p{N}_-]*";

/// `^` and its value. Closing brackets, quotes, emphasis markers and commas end the value.
pub(crate) const DATE_PATTERN: &str = r#"\^([^\s)\]}*"',]+)"#;

/// The rule table, in match order.
pub(crate) static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    use PatternType as P;

    let specs = vec![
        RuleSpec::new(P::Reference, r"\[\[([^\[\]\n]+)\]\]", "reference", extract_verbatim)
            .boundary(Boundary::Any),
        RuleSpec::keyword(P::Title, "title", r#""([^"\n]*)""#, "title", extract_verbatim),
        RuleSpec::keyword(P::Label, "label", r#""([^"\n]*)""#, "label", extract_verbatim),
        RuleSpec::keyword(P::Url, "url", r"(\S+)", "url", extract_verbatim),
        RuleSpec::keyword(P::FileName, "file", r"(\S+)", "fileName", extract_verbatim),
        RuleSpec::keyword(P::Color, "color", r"(\S+)", "textColor", extract_color),
        RuleSpec::keyword(P::BackgroundColor, "bg", r"(\S+)", "backgroundColor", extract_color),
        RuleSpec::keyword(P::BorderColor, "border", r"(\S+)", "borderColor", extract_color),
        RuleSpec::keyword(
            P::FontSize,
            "size",
            r"(\d{1,3}(?:\.\d+)?)(px|pt|em|rem|%)?",
            "fontSize",
            extract_font_size,
        ),
        RuleSpec::keyword(
            P::FontWeight,
            "weight",
            r"(?i)(bold|normal|light|[1-9]00)\b",
            "fontWeight",
            extract_lowercase,
        ),
        RuleSpec::keyword(
            P::FontStyle,
            "style",
            r"(?i)(italic|normal|oblique)\b",
            "fontStyle",
            extract_lowercase,
        ),
        RuleSpec::keyword(
            P::TextAlign,
            "align",
            r"(?i)(left|center|right|justify)\b",
            "textAlign",
            extract_lowercase,
        ),
        RuleSpec::keyword(P::Language, "lang", r"([\w+#.-]+)", "language", extract_lowercase),
        RuleSpec::keyword(
            P::Confidence,
            "confidence",
            r"(\d{1,3})%?",
            "confidence",
            extract_confidence,
        ),
        RuleSpec::keyword(
            P::Question,
            "question",
            r"(?i)(binary|multiple)\b",
            "responseFormat.type",
            extract_lowercase,
        ),
        RuleSpec::keyword(
            P::Multiple,
            "multiple",
            r"(?i)(true|false)\b",
            "responseFormat.multiple",
            extract_boolean,
        ),
        RuleSpec::keyword(
            P::Options,
            "options",
            r"\[([^\]\n]*)\]",
            "responseFormat.options",
            extract_options,
        ),
        RuleSpec::new(P::Date, DATE_PATTERN, "dueDate", extract_date),
        RuleSpec::new(
            P::Priority,
            r"(?i)!(high|medium|low|critical|urgent|asap|blocked|waiting|[123])\b|!+",
            "priority",
            extract_priority,
        )
        .followed_by(Boundary::Word),
        RuleSpec::new(P::Tag, format!("#({IDENT})"), "tags", extract_verbatim)
            .mode(MetadataMode::Append),
        RuleSpec::new(P::Assignee, format!("@({IDENT})"), "assignee", extract_verbatim),
        RuleSpec::new(P::NodeType, format!(r"\$({IDENT})"), "nodeType", extract_lowercase)
            .mode(MetadataMode::KeepFirst),
        RuleSpec::new(P::Status, format!(":({IDENT})"), "status", extract_verbatim)
            .boundary(Boundary::Any)
            .exclusivity(Exclusivity::ExcludesKeywords),
    ];

    specs.into_iter().map(RuleSpec::compile).collect()
});

/// Keywords of the exclusivity group, derived from the table.
pub(crate) static KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    RULES
        .iter()
        .filter(|rule| rule.exclusivity == Exclusivity::Keyword)
        .filter_map(|rule| rule.keyword)
        .collect()
});

/// Whether the word directly before a match ends with a keyword of the
/// exclusivity group (the equivalent of a `(?<!color|bg|...)` lookbehind).
pub(crate) fn ends_with_keyword(before: &str) -> bool {
    let word_start = before.trim_end_matches(char::is_alphanumeric).len();
    let word = before[word_start..].to_lowercase();
    !word.is_empty() && KEYWORDS.iter().any(|keyword| word.ends_with(keyword))
}

fn capture<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1).map(|m| m.as_str())
}

fn extract_verbatim(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    capture(caps).map(Extracted::same)
}

fn extract_lowercase(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    capture(caps).map(|v| Extracted::same(v.to_lowercase()))
}

fn extract_date(caps: &Captures<'_>, ctx: &RuleContext) -> Option<Extracted> {
    let raw = capture(caps)?;
    let Some(resolved) = parse_date_string_at(raw, ctx.now) else {
        return Some(Extracted::same(raw));
    };

    let value = if resolved.time() == NaiveTime::default() {
        date_to_iso(resolved.date())
    } else {
        resolved.format("%Y-%m-%dT%H:%M:%S").to_string()
    };
    let display = format_date_for_display(resolved.date(), ctx.today());
    Some(Extracted::text(value, display))
}

fn extract_priority(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    let raw = caps.get(0)?.as_str();
    let level: Priority = normalize_priority(raw)?;
    Some(Extracted::text(level.as_str(), level.display()))
}

fn extract_color(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    let raw = capture(caps)?;
    let value = parse_color(raw).unwrap_or_else(|| raw.to_string());
    Some(Extracted::text(value, format_color_for_display(raw)))
}

fn extract_font_size(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    let number = capture(caps)?;
    let unit = caps.get(2).map_or("px", |m| m.as_str());
    Some(Extracted::same(format!("{number}{unit}")))
}

fn extract_confidence(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    let value: u8 = capture(caps)?.parse().ok()?;
    if value > 100 {
        return None;
    }
    Some(Extracted::text(value.to_string(), format!("{value}%")).with_metadata(json!(value)))
}

fn extract_boolean(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    let flag = capture(caps)?.eq_ignore_ascii_case("true");
    Some(Extracted::same(flag.to_string()).with_metadata(Value::Bool(flag)))
}

fn extract_options(caps: &Captures<'_>, _ctx: &RuleContext) -> Option<Extracted> {
    let inner = capture(caps)?;
    let options: Vec<Value> = inner
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .enumerate()
        .map(|(index, label)| json!({ "id": format!("option-{index}"), "label": label }))
        .collect();
    Some(Extracted::text(inner, inner.trim()).with_metadata(Value::Array(options)))
}
