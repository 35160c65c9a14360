//! Date parsing and display formatting.
//!
//! Resolves the values typed after the `^` date sigil (`^today`, `^eow`,
//! `^friday`, `^2024-12-15`) into concrete date-times, and renders dates the
//! way the editor shows them ("Today", "Friday", "Mar 4").

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Absolute formats tried after the relative keywords and the three
/// primary numeric layouts.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a date expression relative to the system clock.
///
/// See [`parse_date_string_at`] for the accepted forms.
#[must_use]
pub fn parse_date_string(input: &str) -> Option<NaiveDateTime> {
    parse_date_string_at(input, Local::now().naive_local())
}

/// Parse a date expression relative to `now`.
///
/// Supports (case-insensitive, `-`, `_` and space interchangeable):
/// - `today`, `tomorrow`, `yesterday`
/// - `next week`, `next month`
/// - `eod` (23:59:59 today), `eow` (next Sunday), `eom` (last day of month)
/// - weekday names, resolved to the next occurrence (today excluded)
/// - `YYYY-MM-DD`, `MM/DD/YYYY`, `DD-MM-YYYY`
/// - common absolute layouts such as RFC 3339 or `March 4, 2025`
///
/// Date-only results are at midnight. Returns `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use nodesyntax::core::parse_date_string_at;
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// let parsed = parse_date_string_at("tomorrow", now).unwrap();
/// assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
/// assert!(parse_date_string_at("xyz-not-a-date", now).is_none());
/// ```
#[must_use]
pub fn parse_date_string_at(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let today = now.date();
    let keyword = normalize_keyword(trimmed);

    if let Some(datetime) = parse_relative(&keyword, today) {
        return Some(datetime);
    }

    if let Some(date) = parse_weekday(&keyword).map(|day| next_weekday(today, day)) {
        return Some(midnight(date));
    }

    parse_absolute(trimmed)
}

/// Format a date the way the editor displays it.
///
/// - "Today" / "Tomorrow" for exact date matches
/// - the weekday name for later days of the current Monday–Sunday week
/// - "Mar 4" for other dates this year, "Mar 4, 2027" otherwise
#[must_use]
pub fn format_date_for_display(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(date) {
        return "Tomorrow".to_string();
    }

    if date > today && date.iso_week() == today.iso_week() {
        return weekday_name(date.weekday()).to_string();
    }

    if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// Convert a date to an ISO 8601 `YYYY-MM-DD` string.
#[must_use]
pub fn date_to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Full English weekday name.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Lowercase the input and unify `-`, `_` and whitespace runs to one space.
fn normalize_keyword(input: &str) -> String {
    input
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Relative keywords.
fn parse_relative(keyword: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let date = match keyword {
        "today" => today,
        "tomorrow" => today + Duration::days(1),
        "yesterday" => today - Duration::days(1),
        "next week" => today + Duration::days(7),
        "next month" => today.checked_add_months(Months::new(1))?,
        "eod" => {
            let end = NaiveTime::from_hms_opt(23, 59, 59)?;
            return Some(today.and_time(end));
        },
        "eow" => next_weekday(today, Weekday::Sun),
        "eom" => last_day_of_month(today)?,
        _ => return None,
    };
    Some(midnight(date))
}

/// Parse weekday names, full or abbreviated.
fn parse_weekday(input: &str) -> Option<Weekday> {
    match input {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// The next date falling on `target`, strictly after `today`.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let mut days_until = (i64::from(target.num_days_from_sunday())
        - i64::from(today.weekday().num_days_from_sunday())
        + 7)
        % 7;

    if days_until == 0 {
        days_until = 7;
    }

    today + Duration::days(days_until)
}

fn last_day_of_month(today: NaiveDate) -> Option<NaiveDate> {
    let first = today.with_day(1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// Absolute dates: ISO, US, day-first and the fallback layouts.
fn parse_absolute(input: &str) -> Option<NaiveDateTime> {
    // Bare numbers ("2", "15") are never dates.
    if input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(midnight(date));
    }

    if let Some(date) = parse_numeric_date(input, '/', DateOrder::MonthFirst) {
        return Some(midnight(date));
    }

    if let Some(date) = parse_numeric_date(input, '-', DateOrder::DayFirst) {
        return Some(midnight(date));
    }

    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(datetime.with_timezone(&Local).naive_local());
    }

    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Some(datetime);
        }
    }

    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .map(midnight)
}

#[derive(Debug, Clone, Copy)]
enum DateOrder {
    MonthFirst,
    DayFirst,
}

/// Parse `MM/DD/YYYY` or `DD-MM-YYYY` style dates with a four-digit year.
fn parse_numeric_date(input: &str, separator: char, order: DateOrder) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split(separator).collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }
    if parts[..2].iter().any(|p| p.is_empty() || p.len() > 2) {
        return None;
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    let (month, day) = match order {
        DateOrder::MonthFirst => (first, second),
        DateOrder::DayFirst => (second, first),
    };

    NaiveDate::from_ymd_opt(year, month, day)
}
