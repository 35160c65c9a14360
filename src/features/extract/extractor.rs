//! The extraction pass.
//!
//! Runs the rule table over the input, then the checkbox and formatting
//! scans, and finally strips every matched span to produce clean text.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::rules::{ends_with_keyword, Exclusivity, MetadataMode, Rule, RuleContext, RULES};
use super::{ExtractionResult, PatternMatch, PatternType};
use crate::core::{Clock, SystemClock};

static CHECKBOX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([ xX]?)\]").unwrap_or_else(|e| panic!("Invalid checkbox regex: {e}"))
});

static BOLD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*|__([^_\s](?:[^_\n]*[^_\s])?)__")
        .unwrap_or_else(|e| panic!("Invalid bold regex: {e}"))
});

static ITALIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*|_([^_\s](?:[^_\n]*[^_\s])?)_")
        .unwrap_or_else(|e| panic!("Invalid italic regex: {e}"))
});

/// Extracts inline patterns using an injected clock for relative dates.
#[derive(Clone)]
pub struct Extractor {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor").finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// An extractor reading the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// An extractor reading `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Extract every inline pattern from `text`.
    ///
    /// Never panics; empty or malformed input yields an empty or partial result.
    #[must_use]
    pub fn extract(&self, text: &str) -> ExtractionResult {
        if text.trim().is_empty() {
            return ExtractionResult {
                clean_text: String::new(),
                ..ExtractionResult::default()
            };
        }

        let ctx = RuleContext {
            now: self.clock.now(),
        };
        let mut scan = Scan::new(text);

        for rule in RULES.iter() {
            scan.apply_rule(rule, &ctx);
        }
        scan.checkboxes();
        scan.formatting();

        let clean_text = remove_spans(text, &scan.patterns);

        tracing::debug!(
            patterns = scan.patterns.len(),
            metadata_keys = scan.metadata.len(),
            "extracted inline patterns"
        );

        ExtractionResult {
            clean_text,
            patterns: scan.patterns,
            metadata: scan.metadata,
        }
    }
}

/// Extract inline patterns relative to the system clock.
///
/// # Examples
///
/// ```
/// use nodesyntax::features::extract::{extract_all, PatternType};
///
/// let result = extract_all("Review PR ^tomorrow !!! #urgent color:#ff0000");
/// assert_eq!(result.clean_text, "Review PR");
/// assert_eq!(result.first(PatternType::Priority).unwrap().value, "high");
/// assert_eq!(result.tags(), vec!["urgent"]);
/// assert_eq!(result.metadata["textColor"], "#ff0000");
/// ```
#[must_use]
pub fn extract_all(text: &str) -> ExtractionResult {
    Extractor::new().extract(text)
}

/// Mutable state of one extraction pass.
struct Scan<'t> {
    text: &'t str,
    patterns: Vec<PatternMatch>,
    metadata: Map<String, Value>,
    /// Byte ranges already owned by a rule-table match.
    claimed: Vec<(usize, usize)>,
}

impl<'t> Scan<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            patterns: Vec::new(),
            metadata: Map::new(),
            claimed: Vec::new(),
        }
    }

    fn overlaps_claimed(&self, start: usize, end: usize) -> bool {
        overlaps(&self.claimed, start, end)
    }

    fn previous_char(&self, offset: usize) -> Option<char> {
        self.text[..offset].chars().next_back()
    }

    fn next_char(&self, offset: usize) -> Option<char> {
        self.text[offset..].chars().next()
    }

    fn push(
        &mut self,
        pattern_type: PatternType,
        raw: &str,
        position: usize,
        value: String,
        display: String,
    ) {
        self.patterns.push(PatternMatch {
            pattern_type,
            raw_text: raw.to_string(),
            position,
            value,
            display,
        });
    }

    fn apply_rule(&mut self, rule: &Rule, ctx: &RuleContext) {
        let text = self.text;
        for caps in rule.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let (start, end) = (whole.start(), whole.end());

            if !rule.boundary.allows(self.previous_char(start))
                || !rule.followed_by.allows(self.next_char(end))
            {
                continue;
            }
            if rule.exclusivity == Exclusivity::ExcludesKeywords
                && ends_with_keyword(&text[..start])
            {
                tracing::trace!(raw = whole.as_str(), "skipping keyword-prefixed match");
                continue;
            }
            if self.overlaps_claimed(start, end) {
                continue;
            }
            let Some(extracted) = (rule.extract)(&caps, ctx) else {
                continue;
            };

            let metadata_value = extracted
                .metadata
                .unwrap_or_else(|| Value::String(extracted.value.clone()));
            write_metadata(
                &mut self.metadata,
                rule.metadata_key,
                metadata_value,
                rule.metadata_mode,
            );

            self.claimed.push((start, end));
            self.push(
                rule.pattern_type,
                whole.as_str(),
                start,
                extracted.value,
                extracted.display,
            );
        }
    }

    /// `[ ]`, `[x]`, `[X]` and `[]`, skipping the brackets of `[[references]]`.
    fn checkboxes(&mut self) {
        let text = self.text;
        for caps in CHECKBOX_PATTERN.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let (start, end) = (whole.start(), whole.end());

            if self.previous_char(start) == Some('[') || self.next_char(end) == Some(']') {
                continue;
            }
            if self.overlaps_claimed(start, end) {
                continue;
            }

            let checked = caps
                .get(1)
                .is_some_and(|m| m.as_str().eq_ignore_ascii_case("x"));
            let (value, display) = if checked {
                ("checked", "☑")
            } else {
                ("unchecked", "☐")
            };

            write_metadata(
                &mut self.metadata,
                "completed",
                Value::Bool(checked),
                MetadataMode::Replace,
            );
            self.claimed.push((start, end));
            self.push(
                PatternType::Checkbox,
                whole.as_str(),
                start,
                value.to_string(),
                display.to_string(),
            );
        }
    }

    /// Bold spans first, then italic spans that are not part of a bold run.
    fn formatting(&mut self) {
        let text = self.text;
        let mut bold_spans = Vec::new();

        for (regex, pattern_type) in [
            (&*BOLD_PATTERN, PatternType::Bold),
            (&*ITALIC_PATTERN, PatternType::Italic),
        ] {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let (start, end) = (whole.start(), whole.end());

                if pattern_type == PatternType::Italic && overlaps(&bold_spans, start, end) {
                    continue;
                }
                // Underscores inside identifiers (snake_case_name) are not emphasis.
                if whole.as_str().starts_with('_') && !self.is_word_delimited(start, end) {
                    continue;
                }

                let Some(inner) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                if pattern_type == PatternType::Bold {
                    bold_spans.push((start, end));
                }
                self.push(
                    pattern_type,
                    whole.as_str(),
                    start,
                    inner.as_str().to_string(),
                    inner.as_str().to_string(),
                );
            }
        }
    }

    fn is_word_delimited(&self, start: usize, end: usize) -> bool {
        let is_word = |c: char| c.is_alphanumeric();
        !self.previous_char(start).is_some_and(is_word)
            && !self.next_char(end).is_some_and(is_word)
    }
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

/// Write `value` under a possibly dotted `key`, creating nested objects.
fn write_metadata(
    metadata: &mut Map<String, Value>,
    key: &str,
    value: Value,
    mode: MetadataMode,
) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(leaf) = parts.pop() else {
        return;
    };

    let mut target = metadata;
    for part in parts {
        let entry = target
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        target = map;
    }

    match mode {
        MetadataMode::Replace => {
            target.insert(leaf.to_string(), value);
        },
        MetadataMode::KeepFirst => {
            target.entry(leaf.to_string()).or_insert(value);
        },
        MetadataMode::Append => {
            let entry = target
                .entry(leaf.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            match entry {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![other.take(), value]),
            }
        },
    }
}

/// Remove every matched span, then collapse whitespace runs and trim.
///
/// Spans are removed from the highest offset down so earlier offsets stay
/// valid; overlapping spans are merged first.
fn remove_spans(text: &str, patterns: &[PatternMatch]) -> String {
    let mut spans: Vec<(usize, usize)> =
        patterns.iter().map(|p| (p.position, p.end())).collect();
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = text.to_string();
    for (start, end) in merged.into_iter().rev() {
        out.replace_range(start..end, "");
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, MockClock};
    use chrono::{Duration, Local, NaiveDate};
    use serde_json::json;

    // Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    fn extract(text: &str) -> ExtractionResult {
        Extractor::with_clock(Arc::new(FixedClock::at_date(today()))).extract(text)
    }

    fn types(result: &ExtractionResult) -> Vec<PatternType> {
        result.patterns.iter().map(|p| p.pattern_type).collect()
    }

    // ==================
    // End-to-end
    // ==================

    #[test]
    fn test_review_pr_scenario() {
        let result = extract("Review PR ^tomorrow !!! #urgent color:#ff0000");

        assert_eq!(result.clean_text, "Review PR");

        let date = result.first(PatternType::Date).unwrap();
        assert_eq!(date.value, "2024-03-14");
        assert_eq!(date.display, "Tomorrow");
        assert_eq!(date.raw_text, "^tomorrow");

        let priority = result.first(PatternType::Priority).unwrap();
        assert_eq!(priority.value, "high");
        assert_eq!(priority.raw_text, "!!!");

        assert_eq!(result.tags(), vec!["urgent"]);
        assert_eq!(result.metadata["tags"], json!(["urgent"]));

        let color = result.first(PatternType::Color).unwrap();
        assert_eq!(color.value, "#ff0000");
        assert_eq!(color.display, "#FF0000");
        assert_eq!(result.metadata["textColor"], "#ff0000");
        assert_eq!(result.metadata["dueDate"], "2024-03-14");
        assert_eq!(result.metadata["priority"], "high");

        assert_eq!(result.of_type(PatternType::Tag).count(), 1);
        assert!(result.first(PatternType::Status).is_none());
    }

    #[test]
    fn test_review_pr_scenario_system_clock() {
        let result = extract_all("Review PR ^tomorrow !!! #urgent color:#ff0000");
        let tomorrow = Local::now().date_naive() + Duration::days(1);

        assert_eq!(result.clean_text, "Review PR");
        let date = result.first(PatternType::Date).unwrap();
        assert_eq!(date.value, tomorrow.format("%Y-%m-%d").to_string());
        assert_eq!(date.display, "Tomorrow");
    }

    #[test]
    fn test_mock_clock_drives_dates() {
        let mut clock = MockClock::new();
        let now = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        clock.expect_now().times(1).return_const(now);

        let result = Extractor::with_clock(Arc::new(clock)).extract("ship ^tomorrow");
        let date = result.first(PatternType::Date).unwrap();
        assert_eq!(date.value, "2026-01-01");
        assert_eq!(date.display, "Tomorrow");
    }

    // ==================
    // Edge inputs
    // ==================

    #[test]
    fn test_empty_and_whitespace_input() {
        for input in ["", "   ", "\n\t"] {
            let result = extract(input);
            assert!(result.patterns.is_empty());
            assert!(result.metadata.is_empty());
            assert_eq!(result.clean_text, "");
        }
    }

    #[test]
    fn test_plain_text_untouched() {
        let result = extract("just  some   words");
        assert!(result.patterns.is_empty());
        assert_eq!(result.clean_text, "just some words");
    }

    #[test]
    fn test_adversarial_inputs_do_not_panic() {
        let inputs = [
            "[".repeat(2000),
            "]".repeat(2000),
            "!".repeat(2000),
            "*".repeat(2000),
            "_".repeat(2000),
            "[[".repeat(1000) + "x",
            ":".repeat(1000) + "a",
            "#".repeat(1000),
            "^ ".repeat(1000),
            "title:\"".repeat(500),
        ];
        for input in &inputs {
            let result = extract(input);
            for p in &result.patterns {
                assert_eq!(&input[p.position..p.end()], p.raw_text);
            }
        }
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let text = "Café ^today #été @zoë";
        let result = extract(text);
        assert_eq!(result.patterns.len(), 3);
        for p in &result.patterns {
            assert_eq!(&text[p.position..p.end()], p.raw_text);
        }
        assert_eq!(result.tags(), vec!["été"]);
        assert_eq!(result.clean_text, "Café");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let inputs = [
            "Review PR ^tomorrow !!! #urgent color:#ff0000",
            "[x] call @sam about [[Budget]] :blocked",
            "title:\"Plan\" size:14 weight:bold align:center notes here",
            "**bold** words and *italic* ones $task",
            "Great news !!!!",
            "task !10 later",
        ];
        for input in inputs {
            let first = extract(input);
            let second = extract(&first.clean_text);
            assert!(
                second.patterns.is_empty(),
                "re-matched {:?} in {:?}",
                second.patterns,
                first.clean_text
            );
            assert_eq!(second.clean_text, first.clean_text);
        }
    }

    // ==================
    // Checkboxes
    // ==================

    #[test]
    fn test_checkbox_states() {
        for inner in ["", " ", "x", "X"] {
            let text = format!("[{inner}] foo");
            let result = extract(&text);
            let boxes: Vec<_> = result.of_type(PatternType::Checkbox).collect();
            assert_eq!(boxes.len(), 1, "input {text:?}");
            let expected = if inner.eq_ignore_ascii_case("x") {
                "checked"
            } else {
                "unchecked"
            };
            assert_eq!(boxes[0].value, expected);
            assert_eq!(result.clean_text, "foo");
        }
    }

    #[test]
    fn test_checkbox_not_inside_reference() {
        let result = extract("[[foo]]");
        assert!(result.first(PatternType::Checkbox).is_none());
        assert_eq!(result.first(PatternType::Reference).unwrap().value, "foo");

        let result = extract("see [[x]] and [[ ]]");
        assert!(result.first(PatternType::Checkbox).is_none());
    }

    #[test]
    fn test_checkbox_metadata() {
        let result = extract("[x] done thing");
        assert_eq!(result.metadata["completed"], json!(true));
    }

    // ==================
    // Rules
    // ==================

    #[test]
    fn test_status_excluded_after_keyword() {
        let result = extract("color:green");
        assert_eq!(types(&result), vec![PatternType::Color]);
        assert_eq!(result.patterns[0].value, "#008000");

        let result = extract("weight:heavy");
        assert!(result.patterns.is_empty());
    }

    #[test]
    fn test_status_rule() {
        let result = extract("deploy :in-progress");
        let status = result.first(PatternType::Status).unwrap();
        assert_eq!(status.value, "in-progress");
        assert_eq!(result.metadata["status"], "in-progress");
        assert_eq!(result.clean_text, "deploy");

        assert!(extract("meet at 10:30").patterns.is_empty());
        assert!(extract("Note: later").patterns.is_empty());
    }

    #[test]
    fn test_priority_forms() {
        let cases = [
            ("!", "low"),
            ("!!", "medium"),
            ("!!!", "high"),
            ("!HIGH", "high"),
            ("!asap", "asap"),
            ("!blocked", "blocked"),
            ("!1", "high"),
            ("!2", "medium"),
            ("!3", "low"),
        ];
        for (input, expected) in cases {
            let result = extract(&format!("task {input}"));
            let priority = result.first(PatternType::Priority).unwrap();
            assert_eq!(priority.value, expected, "input {input}");
            assert_eq!(priority.raw_text, input);
        }
    }

    #[test]
    fn test_priority_needs_boundary() {
        assert!(extract("Hello!").first(PatternType::Priority).is_none());
    }

    #[test]
    fn test_priority_bang_run_must_end_cleanly() {
        for text in ["Great news !!!!", "task !10 later", "try !!x now", "ok !_"] {
            let result = extract(text);
            assert!(result.patterns.is_empty(), "input {text:?}: {:?}", result.patterns);
            assert_eq!(result.clean_text, text);
        }

        let result = extract("ship it !!!.");
        assert_eq!(result.first(PatternType::Priority).unwrap().value, "high");
    }

    #[test]
    fn test_date_fallback_to_raw() {
        let result = extract("^someday maybe");
        let date = result.first(PatternType::Date).unwrap();
        assert_eq!(date.value, "someday");
        assert_eq!(date.display, "someday");
    }

    #[test]
    fn test_date_stops_at_closing_punctuation() {
        let result = extract("(due ^friday) and **fix ^today**, ok");
        let dates: Vec<&str> = result
            .of_type(PatternType::Date)
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(dates, vec!["2024-03-15", "2024-03-13"]);
        assert_eq!(result.patterns[0].raw_text, "^friday");
    }

    #[test]
    fn test_date_eod_keeps_time() {
        let result = extract("^eod");
        assert_eq!(result.patterns[0].value, "2024-03-13T23:59:59");
        assert_eq!(result.patterns[0].display, "Today");
    }

    #[test]
    fn test_date_weekday_display() {
        let result = extract("^friday");
        assert_eq!(result.patterns[0].value, "2024-03-15");
        assert_eq!(result.patterns[0].display, "Friday");
    }

    #[test]
    fn test_tags_accumulate_in_order() {
        let result = extract("#a #b #a");
        assert_eq!(result.metadata["tags"], json!(["a", "b", "a"]));
    }

    #[test]
    fn test_sigils_need_boundary() {
        let result = extract("C#sharp mail a@b.com cost$5");
        assert!(result.patterns.is_empty());
    }

    #[test]
    fn test_tag_must_start_with_letter() {
        assert!(extract("issue #123").patterns.is_empty());
        assert_eq!(extract("#q4-2024").tags(), vec!["q4-2024"]);
    }

    #[test]
    fn test_assignee_and_reference() {
        let result = extract("ask @jane-doe about [[Q3 Roadmap]]");
        assert_eq!(result.metadata["assignee"], "jane-doe");
        assert_eq!(result.metadata["reference"], "Q3 Roadmap");
        assert_eq!(result.clean_text, "ask about");
    }

    #[test]
    fn test_quoted_title_protects_contents() {
        let result = extract(r#"title:"Plan #q3 with @bob" #work"#);
        assert_eq!(result.metadata["title"], "Plan #q3 with @bob");
        assert_eq!(result.tags(), vec!["work"]);
        assert!(result.first(PatternType::Assignee).is_none());
    }

    #[test]
    fn test_style_directives() {
        let result = extract("size:14 weight:BOLD style:italic align:center bg:navy border:#ABC");
        assert_eq!(result.metadata["fontSize"], "14px");
        assert_eq!(result.metadata["fontWeight"], "bold");
        assert_eq!(result.metadata["fontStyle"], "italic");
        assert_eq!(result.metadata["textAlign"], "center");
        assert_eq!(result.metadata["backgroundColor"], "#000080");
        assert_eq!(result.metadata["borderColor"], "#abc");
        assert_eq!(result.clean_text, "");
    }

    #[test]
    fn test_code_directives() {
        let result = extract("snippet lang:Rust file:src/main.rs url:https://example.com/a#b");
        assert_eq!(result.metadata["language"], "rust");
        assert_eq!(result.metadata["fileName"], "src/main.rs");
        assert_eq!(result.metadata["url"], "https://example.com/a#b");
        assert!(result.first(PatternType::Tag).is_none());
        assert_eq!(result.clean_text, "snippet");
    }

    #[test]
    fn test_confidence() {
        let result = extract("guess confidence:85%");
        assert_eq!(result.metadata["confidence"], json!(85));
        assert_eq!(result.first(PatternType::Confidence).unwrap().display, "85%");

        assert!(extract("confidence:150").first(PatternType::Confidence).is_none());
    }

    #[test]
    fn test_question_metadata_nests() {
        let result = extract("Pick one question:multiple multiple:TRUE options:[Red, Green ,Blue]");
        assert_eq!(
            result.metadata["responseFormat"],
            json!({
                "type": "multiple",
                "multiple": true,
                "options": [
                    {"id": "option-0", "label": "Red"},
                    {"id": "option-1", "label": "Green"},
                    {"id": "option-2", "label": "Blue"},
                ],
            })
        );
        assert_eq!(
            result.metadata_path("responseFormat.multiple"),
            Some(&json!(true))
        );
        assert_eq!(result.clean_text, "Pick one");
    }

    #[test]
    fn test_node_type_first_wins() {
        let result = extract("$Task then $note");
        assert_eq!(result.of_type(PatternType::NodeType).count(), 2);
        assert_eq!(result.metadata["nodeType"], "task");
        assert_eq!(result.clean_text, "then");
    }

    #[test]
    fn test_bold_and_italic() {
        let result = extract("a **strong** b *soft* c _under_ d");
        let bold: Vec<_> = result.of_type(PatternType::Bold).map(|p| &p.value).collect();
        let italic: Vec<_> = result.of_type(PatternType::Italic).map(|p| &p.value).collect();
        assert_eq!(bold, vec!["strong"]);
        assert_eq!(italic, vec!["soft", "under"]);
        assert_eq!(result.clean_text, "a b c d");
    }

    #[test]
    fn test_snake_case_is_not_italic() {
        let result = extract("call snake_case_name now");
        assert!(result.patterns.is_empty());
    }

    #[test]
    fn test_write_metadata_modes() {
        let mut map = Map::new();
        write_metadata(&mut map, "a.b", json!(1), MetadataMode::Replace);
        write_metadata(&mut map, "a.b", json!(2), MetadataMode::KeepFirst);
        write_metadata(&mut map, "a.c", json!("x"), MetadataMode::Append);
        write_metadata(&mut map, "a.c", json!("y"), MetadataMode::Append);
        assert_eq!(Value::Object(map), json!({"a": {"b": 1, "c": ["x", "y"]}}));
    }
}
