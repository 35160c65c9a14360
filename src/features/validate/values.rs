//! Validators for a single pattern value.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::{QuickFix, Span, ValidationError};
use crate::core::{
    date_to_iso, is_valid_color, normalize_priority, parse_date_string_at, Priority, NAMED_COLORS,
};
use crate::error::NodeSyntaxError;

/// Which dates a `^date` value may take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DateConstraint {
    /// Any parseable date.
    #[default]
    Any,
    /// Today or later.
    FutureOnly,
    /// Today or earlier.
    PastOnly,
    /// Between `min` and `max`, inclusive.
    Range { min: NaiveDate, max: NaiveDate },
}

impl DateConstraint {
    /// An inclusive range constraint.
    ///
    /// # Errors
    ///
    /// Returns an error if `min` is after `max`.
    pub fn range(min: NaiveDate, max: NaiveDate) -> Result<Self, NodeSyntaxError> {
        if min > max {
            return Err(NodeSyntaxError::InvalidDate(format!(
                "range start {} is after range end {}",
                date_to_iso(min),
                date_to_iso(max)
            )));
        }
        Ok(Self::Range { min, max })
    }
}

fn keyword_fixes<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Vec<QuickFix> {
    keywords
        .into_iter()
        .map(|k| QuickFix::new(format!("Use {k}"), k))
        .collect()
}

/// Check a `^date` value.
///
/// `span` covers the value without the `^`; every quick fix replaces it.
#[must_use]
pub fn validate_date(
    value: &str,
    constraint: &DateConstraint,
    span: Span,
    now: NaiveDateTime,
) -> Option<ValidationError> {
    let today = now.date();
    let value = value.trim();

    if value.is_empty() {
        return Some(
            ValidationError::error("Date is empty", span)
                .with_suggestion("today")
                .with_quick_fixes(keyword_fixes(["today", "tomorrow"])),
        );
    }

    let Some(parsed) = parse_date_string_at(value, now) else {
        let iso_today = date_to_iso(today);
        let mut fixes = keyword_fixes(["today", "tomorrow", "next-week"]);
        fixes.push(
            QuickFix::new(format!("Use {iso_today}"), iso_today)
                .describe("Dates can be written as YYYY-MM-DD"),
        );
        return Some(
            ValidationError::error(format!("Unrecognized date \"{value}\""), span)
                .with_suggestion("today")
                .with_quick_fixes(fixes),
        );
    };

    let date = parsed.date();
    match *constraint {
        DateConstraint::Any => None,
        DateConstraint::FutureOnly if date < today => Some(
            ValidationError::warning(
                format!("{} is in the past", date_to_iso(date)),
                span,
            )
            .with_suggestion("today")
            .with_quick_fixes(keyword_fixes(["today", "tomorrow", "next-week"])),
        ),
        DateConstraint::PastOnly if date > today => Some(
            ValidationError::warning(
                format!("{} is in the future", date_to_iso(date)),
                span,
            )
            .with_suggestion("today")
            .with_quick_fixes(keyword_fixes(["today", "yesterday"])),
        ),
        DateConstraint::Range { min, max } if date < min || date > max => {
            let nearest = date_to_iso(if date < min { min } else { max });
            let (min, max) = (date_to_iso(min), date_to_iso(max));
            Some(
                ValidationError::warning(
                    format!("{} is outside {min} to {max}", date_to_iso(date)),
                    span,
                )
                .with_suggestion(nearest)
                .with_quick_fixes([
                    QuickFix::new(format!("Use {min}"), min),
                    QuickFix::new(format!("Use {max}"), max),
                ]),
            )
        },
        DateConstraint::FutureOnly | DateConstraint::PastOnly | DateConstraint::Range { .. } => {
            None
        },
    }
}

/// Check a color value from `color:`, `bg:` or `border:`.
#[must_use]
pub fn validate_color(value: &str, span: Span) -> Option<ValidationError> {
    let value = value.trim();
    if is_valid_color(value) {
        return None;
    }

    if value.is_empty() {
        return Some(
            ValidationError::error("Color is empty", span)
                .with_quick_fixes(keyword_fixes(["black", "red", "blue"])),
        );
    }

    let lower = value.to_lowercase();
    let error = if let Some(digits) = lower.strip_prefix('#') {
        let hex: String = digits.chars().filter(char::is_ascii_hexdigit).collect();
        let mut error = ValidationError::error(
            format!("Invalid hex color \"{value}\": use #RGB or #RRGGBB"),
            span,
        );
        let repaired = match hex.len() {
            n if n >= 6 => Some(format!("#{}", &hex[..6])),
            n if n >= 3 => Some(format!("#{}", &hex[..3])),
            _ => None,
        };
        if let Some(repaired) = repaired {
            error = error
                .with_suggestion(repaired.clone())
                .with_quick_fixes([QuickFix::new(format!("Use {repaired}"), repaired)]);
        }
        error.with_quick_fixes(keyword_fixes(["#000000", "#ffffff"]))
    } else if lower.starts_with("rgb") {
        ValidationError::error(
            format!("Invalid rgb color \"{value}\": channels are 0-255 and alpha is 0-1"),
            span,
        )
        .with_quick_fixes(keyword_fixes(["rgb(0,0,0)", "rgb(255,255,255)"]))
    } else if lower.starts_with("hsl") {
        ValidationError::error(
            format!(
                "Invalid hsl color \"{value}\": hue is 0-360, saturation and lightness are 0-100%"
            ),
            span,
        )
        .with_quick_fixes(keyword_fixes(["hsl(0,0%,0%)", "hsl(0,0%,100%)"]))
    } else {
        let similar: Vec<&str> = lower
            .chars()
            .next()
            .map(|first| {
                NAMED_COLORS
                    .iter()
                    .map(|(name, _)| *name)
                    .filter(|name| name.starts_with(first))
                    .take(3)
                    .collect()
            })
            .unwrap_or_default();
        let mut error = ValidationError::error(
            format!(
                "Unknown color \"{value}\": use a name (red), hex (#ff0000), rgb(255,0,0) or hsl(0,100%,50%)"
            ),
            span,
        );
        if let Some(first) = similar.first() {
            error = error.with_suggestion(*first);
        }
        error.with_quick_fixes(keyword_fixes(similar))
    };

    Some(error)
}

/// Check a `!word` priority value.
#[must_use]
pub fn validate_priority(value: &str, span: Span) -> Option<ValidationError> {
    let value = value.trim();
    if normalize_priority(value).is_some() {
        return None;
    }

    let lower = value.to_lowercase();
    let mut closest: Vec<Priority> = lower
        .chars()
        .next()
        .map(|first| {
            Priority::all()
                .iter()
                .copied()
                .filter(|p| p.as_str().starts_with(first))
                .collect()
        })
        .unwrap_or_default();
    if closest.is_empty() {
        closest = vec![Priority::High, Priority::Medium, Priority::Low];
    }

    Some(
        ValidationError::error(format!("Unknown priority \"{value}\""), span)
            .with_suggestion(closest[0].as_str())
            .with_quick_fixes(
                closest
                    .iter()
                    .map(|p| QuickFix::new(p.display(), p.as_str())),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, FixedClock};
    use crate::features::validate::Severity;

    fn now() -> NaiveDateTime {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()).now()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    const SPAN: Span = Span::new(0, 4);

    #[test]
    fn test_valid_dates() {
        for value in ["today", "tomorrow", "next-week", "2024-12-25", "fri", "eom"] {
            assert!(
                validate_date(value, &DateConstraint::Any, SPAN, now()).is_none(),
                "value {value}"
            );
        }
    }

    #[test]
    fn test_empty_date() {
        let error = validate_date("  ", &DateConstraint::Any, SPAN, now()).unwrap();
        assert_eq!(error.severity, Severity::Error);
        assert_eq!(error.message, "Date is empty");
    }

    #[test]
    fn test_unparseable_date_fixes() {
        let error = validate_date("someday", &DateConstraint::Any, SPAN, now()).unwrap();
        let replacements: Vec<&str> = error
            .quick_fixes
            .iter()
            .map(|f| f.replacement.as_str())
            .collect();
        assert_eq!(
            replacements,
            vec!["today", "tomorrow", "next-week", "2024-03-13"]
        );
    }

    #[test]
    fn test_future_only() {
        let constraint = DateConstraint::FutureOnly;
        assert!(validate_date("today", &constraint, SPAN, now()).is_none());
        assert!(validate_date("tomorrow", &constraint, SPAN, now()).is_none());

        let error = validate_date("2024-03-01", &constraint, SPAN, now()).unwrap();
        assert_eq!(error.severity, Severity::Warning);
        assert!(error.message.contains("past"));
    }

    #[test]
    fn test_past_only() {
        let constraint = DateConstraint::PastOnly;
        assert!(validate_date("yesterday", &constraint, SPAN, now()).is_none());
        assert!(validate_date("tomorrow", &constraint, SPAN, now()).is_some());
    }

    #[test]
    fn test_range_constraint() {
        let constraint = DateConstraint::range(day(10), day(20)).unwrap();
        assert!(validate_date("2024-03-15", &constraint, SPAN, now()).is_none());

        let early = validate_date("2024-03-01", &constraint, SPAN, now()).unwrap();
        assert_eq!(early.suggestion.as_deref(), Some("2024-03-10"));

        let late = validate_date("2024-04-01", &constraint, SPAN, now()).unwrap();
        assert_eq!(late.suggestion.as_deref(), Some("2024-03-20"));
        assert_eq!(late.quick_fixes.len(), 2);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateConstraint::range(day(20), day(10)).unwrap_err();
        assert!(matches!(err, NodeSyntaxError::InvalidDate(_)));
    }

    #[test]
    fn test_valid_colors() {
        for value in ["red", "#f00", "#FF0000", "rgb(1, 2, 3)", "hsl(120,50%,50%)"] {
            assert!(validate_color(value, SPAN).is_none(), "value {value}");
        }
    }

    #[test]
    fn test_hex_color_repair() {
        let error = validate_color("#ff00001", SPAN).unwrap();
        assert!(error.message.contains("hex"));
        assert_eq!(error.suggestion.as_deref(), Some("#ff0000"));

        let error = validate_color("#ggg", SPAN).unwrap();
        assert!(error.suggestion.is_none());
        assert_eq!(error.quick_fixes.len(), 2);
    }

    #[test]
    fn test_functional_color_messages() {
        assert!(validate_color("rgb(300,0,0)", SPAN)
            .unwrap()
            .message
            .contains("0-255"));
        assert!(validate_color("hsl(400,0%,0%)", SPAN)
            .unwrap()
            .message
            .contains("0-360"));
    }

    #[test]
    fn test_unknown_color_name() {
        let error = validate_color("bluish", SPAN).unwrap();
        assert!(error.message.contains("use a name"));
        assert!(error.quick_fixes.iter().any(|f| f.replacement == "blue"));
    }

    #[test]
    fn test_priority_values() {
        assert!(validate_priority("high", SPAN).is_none());
        assert!(validate_priority("P1", SPAN).is_none());

        let error = validate_priority("hgih", SPAN).unwrap();
        assert_eq!(error.suggestion.as_deref(), Some("high"));

        let error = validate_priority("zzz", SPAN).unwrap();
        assert_eq!(error.quick_fixes.len(), 3);
    }
}
