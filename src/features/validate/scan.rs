//! Whole-text checks: dangling triggers, repeated node types and brackets.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{QuickFix, Span, ValidationError};
use crate::config::ValidationConfig;
use crate::features::extract::Boundary;

static TRIGGER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\^|!+|(?i:color|bg|border):")
        .unwrap_or_else(|e| panic!("Invalid trigger regex: {e}"))
});

static NODE_TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([\p{L}][\p{L}\p{N}_-]*)")
        .unwrap_or_else(|e| panic!("Invalid node type regex: {e}"))
});

fn previous_char(text: &str, offset: usize) -> Option<char> {
    text[..offset].chars().next_back()
}

/// Triggers typed with nothing after them: `^`, a lone `!`, `color:`.
///
/// Silent while the trimmed input is shorter than `min_input_length`.
#[must_use]
pub fn find_incomplete_patterns(text: &str, config: &ValidationConfig) -> Vec<ValidationError> {
    if text.trim().chars().count() < config.min_input_length {
        return Vec::new();
    }

    let mut errors = Vec::new();
    for m in TRIGGER_PATTERN.find_iter(text) {
        if !text[m.end()..].chars().next().map_or(true, char::is_whitespace) {
            continue;
        }

        let trigger = m.as_str();
        let span = Span::new(m.start(), m.end());
        let previous = previous_char(text, m.start());

        let error = if trigger == "^" {
            if !Boundary::Sigil.allows(previous) {
                continue;
            }
            ValidationError::warning("Incomplete date: add a value after ^", span)
                .with_suggestion("^today")
                .with_quick_fixes(
                    ["today", "tomorrow", "next-week"]
                        .map(|k| QuickFix::new(format!("Due {k}"), format!("^{k}"))),
                )
        } else if trigger.starts_with('!') {
            // `!!` and `!!!` are complete priorities.
            if trigger.len() > 1 || !Boundary::Sigil.allows(previous) {
                continue;
            }
            ValidationError::info("A bare ! means low priority. Add a level such as !high", span)
                .with_quick_fixes(
                    ["high", "medium", "low"]
                        .map(|k| QuickFix::new(format!("Priority {k}"), format!("!{k}"))),
                )
        } else {
            if !Boundary::Word.allows(previous) {
                continue;
            }
            ValidationError::warning(
                format!("Incomplete color: add a value after {trigger}"),
                span,
            )
            .with_quick_fixes(
                ["red", "blue", "#000000"]
                    .map(|c| QuickFix::new(format!("Use {c}"), format!("{trigger}{c}"))),
            )
        };
        errors.push(error);
    }

    errors
}

/// Every `$type` after the first one. Only the first sets the node type.
#[must_use]
pub fn find_duplicate_node_types(text: &str) -> Vec<ValidationError> {
    let mut first: Option<&str> = None;
    let mut errors = Vec::new();

    for caps in NODE_TYPE_PATTERN.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !Boundary::Sigil.allows(previous_char(text, whole.start())) {
            continue;
        }

        match first {
            None => first = Some(name.as_str()),
            Some(kept) => errors.push(
                ValidationError::error(
                    format!(
                        "Duplicate node type ${}: only ${kept} applies",
                        name.as_str()
                    ),
                    Span::new(whole.start(), whole.end()),
                )
                .with_quick_fixes([QuickFix::new("Remove duplicate", "")]),
            ),
        }
    }

    errors
}

const fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '{' => '}',
        _ => ']',
    }
}

/// Brackets left open at the end of the text (errors), and closers with no
/// opener (warnings, since `1)` and `:)` are ordinary prose).
///
/// An unclosed bracket's span runs to the end of the text so the quick fix
/// can append the closer.
#[must_use]
pub fn find_unclosed_brackets(text: &str) -> Vec<ValidationError> {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut errors = Vec::new();

    for (offset, c) in text.char_indices() {
        match c {
            '[' | '(' | '{' => open.push((c, offset)),
            ']' | ')' | '}' => {
                if open.last().is_some_and(|&(o, _)| closer_for(o) == c) {
                    open.pop();
                } else {
                    errors.push(
                        ValidationError::warning(
                            format!("Unmatched '{c}'"),
                            Span::new(offset, offset + c.len_utf8()),
                        )
                        .with_quick_fixes([QuickFix::new(format!("Remove '{c}'"), "")]),
                    );
                }
            },
            _ => {},
        }
    }

    for (c, offset) in open {
        let closer = closer_for(c);
        let replacement = format!("{}{closer}", &text[offset..]);
        errors.push(
            ValidationError::error(format!("Unclosed '{c}'"), Span::new(offset, text.len()))
                .with_suggestion(replacement.clone())
                .with_quick_fixes([QuickFix::new(format!("Add '{closer}'"), replacement)]),
        );
    }

    errors.sort_by_key(|e| e.span.start);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::validate::Severity;

    fn config() -> ValidationConfig {
        ValidationConfig::default()
    }

    #[test]
    fn test_dangling_date() {
        let errors = find_incomplete_patterns("Fix bug ^", &config());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Warning);
        assert_eq!(errors[0].span, Span::new(8, 9));
        assert_eq!(errors[0].quick_fixes[0].replacement, "^today");
    }

    #[test]
    fn test_lone_bang_is_info() {
        let errors = find_incomplete_patterns("Fix bug ! later", &config());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Info);

        assert!(find_incomplete_patterns("Fix bug !!! later", &config()).is_empty());
        assert!(find_incomplete_patterns("Fix bug !!", &config()).is_empty());
        assert!(find_incomplete_patterns("Hello! there", &config()).is_empty());
    }

    #[test]
    fn test_dangling_color_keyword() {
        let errors = find_incomplete_patterns("Paint BG: now", &config());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].quick_fixes[0].replacement, "BG:red");

        assert!(find_incomplete_patterns("Paint color:red", &config()).is_empty());
        assert!(find_incomplete_patterns("Paint forecolor: x", &config()).is_empty());
    }

    #[test]
    fn test_short_input_is_silent() {
        assert!(find_incomplete_patterns("@2", &config()).is_empty());
        assert!(find_incomplete_patterns("^2", &config()).is_empty());
        assert!(find_incomplete_patterns("^", &config()).is_empty());
        assert!(find_incomplete_patterns(" ! ", &config()).is_empty());
    }

    #[test]
    fn test_duplicate_node_types() {
        assert!(find_duplicate_node_types("$task only").is_empty());

        let errors = find_duplicate_node_types("$task and $note and $idea");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span, Span::new(10, 15));
        assert!(errors[0].message.contains("$task"));
        assert_eq!(errors[1].quick_fixes[0].label, "Remove duplicate");
        assert_eq!(errors[1].quick_fixes[0].replacement, "");
    }

    #[test]
    fn test_prices_are_not_node_types() {
        assert!(find_duplicate_node_types("costs $5 or US$task").is_empty());
    }

    #[test]
    fn test_unclosed_bracket_at_end() {
        let errors = find_unclosed_brackets("see [[Roadmap");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span, Span::new(4, 13));
        assert_eq!(errors[1].suggestion.as_deref(), Some("[Roadmap]"));
    }

    #[test]
    fn test_balanced_brackets() {
        assert!(find_unclosed_brackets("[[a]] (b) {c} [x] [ ]").is_empty());
        assert!(find_unclosed_brackets("options:[a, b]").is_empty());
    }

    #[test]
    fn test_stray_and_mismatched_closers() {
        let errors = find_unclosed_brackets("oops) and (this]");
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["Unmatched ')'", "Unclosed '('", "Unmatched ']'"]);
    }

    #[test]
    fn test_stray_closers_in_prose_are_warnings() {
        let errors = find_unclosed_brackets("1) first :) done");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.severity == Severity::Warning));

        let errors = find_unclosed_brackets("draft (v2");
        assert_eq!(errors[0].severity, Severity::Error);
    }
}
