//! Editor decorations from an extraction result.

use serde::Serialize;

use crate::features::extract::{ExtractionResult, PatternType};

/// A styled byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    /// `ns-` plus the kebab-case type, e.g. `ns-background-color`.
    pub class: String,
}

/// CSS class for a pattern type.
#[must_use]
pub fn css_class(pattern_type: PatternType) -> String {
    let mut class = String::from("ns-");
    for c in pattern_type.as_str().chars() {
        if c.is_ascii_uppercase() {
            class.push('-');
            class.push(c.to_ascii_lowercase());
        } else {
            class.push(c);
        }
    }
    class
}

/// Non-overlapping spans sorted by position.
///
/// Matches are taken in scan order, so when two overlap (`**due ^today**`) the one
/// found first wins.
#[must_use]
pub fn highlight(result: &ExtractionResult) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = Vec::with_capacity(result.patterns.len());

    for pattern in &result.patterns {
        let (start, end) = (pattern.position, pattern.end());
        if spans.iter().any(|s| start < s.end && s.start < end) {
            continue;
        }
        spans.push(HighlightSpan {
            start,
            end,
            pattern_type: pattern.pattern_type,
            class: css_class(pattern.pattern_type),
        });
    }

    spans.sort_by_key(|s| s.start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;
    use crate::features::extract::Extractor;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn extract(text: &str) -> ExtractionResult {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        Extractor::with_clock(Arc::new(FixedClock::at_date(today))).extract(text)
    }

    #[test]
    fn test_css_class() {
        assert_eq!(css_class(PatternType::Tag), "ns-tag");
        assert_eq!(css_class(PatternType::BackgroundColor), "ns-background-color");
        assert_eq!(css_class(PatternType::NodeType), "ns-node-type");
    }

    #[test]
    fn test_sorted_by_position() {
        let result = extract("#work due ^friday !!");
        let spans = highlight(&result);

        let types: Vec<PatternType> = spans.iter().map(|s| s.pattern_type).collect();
        assert_eq!(
            types,
            vec![PatternType::Tag, PatternType::Date, PatternType::Priority]
        );
        assert_eq!((spans[0].start, spans[0].end), (0, 5));
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let result = extract("**fix ^today**");
        assert_eq!(result.patterns.len(), 2);

        let spans = highlight(&result);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].pattern_type, PatternType::Date);
        assert_eq!(spans[0].start, 6);
    }

    #[test]
    fn test_empty_result() {
        assert!(highlight(&ExtractionResult::default()).is_empty());
    }
}
