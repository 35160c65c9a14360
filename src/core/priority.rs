//! Priority levels, aliases and ordering.
//!
//! Priorities are typed as `!`, `!!`, `!!!`, `!high`, `!p1` and friends.
//! Everything resolves to one of eight canonical levels.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NodeSyntaxError;

/// Canonical priority levels, declared from most to least pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Drop everything.
    Asap,
    /// Critical issue.
    Critical,
    /// Urgent, time-sensitive.
    Urgent,
    /// High priority (`!!!`, `!1`).
    High,
    /// Medium priority (`!!`, `!2`).
    Medium,
    /// Low priority (`!`, `!3`).
    Low,
    /// Blocked on something else.
    Blocked,
    /// Waiting on someone.
    Waiting,
}

const ALL: [Priority; 8] = [
    Priority::Asap,
    Priority::Critical,
    Priority::Urgent,
    Priority::High,
    Priority::Medium,
    Priority::Low,
    Priority::Blocked,
    Priority::Waiting,
];

/// Shorthand aliases and the level they resolve to.
pub const PRIORITY_ALIASES: &[(&str, Priority)] = &[
    ("lo", Priority::Low),
    ("med", Priority::Medium),
    ("mid", Priority::Medium),
    ("hi", Priority::High),
    ("crit", Priority::Critical),
    ("urg", Priority::Urgent),
    ("block", Priority::Blocked),
    ("wait", Priority::Waiting),
    ("p0", Priority::Critical),
    ("p1", Priority::High),
    ("p2", Priority::Medium),
    ("p3", Priority::Low),
];

impl Priority {
    /// All levels in sort order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &ALL
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::Critical => "critical",
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Blocked => "blocked",
            Self::Waiting => "waiting",
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Asap => "ASAP",
            Self::Critical => "Critical",
            Self::Urgent => "Urgent",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Blocked => "Blocked",
            Self::Waiting => "Waiting",
        }
    }

    /// Icon shown next to the label.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Asap => "⚡",
            Self::Critical => "🔥",
            Self::Urgent => "🚨",
            Self::High => "🔴",
            Self::Medium => "🟡",
            Self::Low => "🟢",
            Self::Blocked => "⛔",
            Self::Waiting => "⏳",
        }
    }

    /// Hex color used for badges.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Asap => "#7c3aed",
            Self::Critical => "#dc2626",
            Self::Urgent => "#ea580c",
            Self::High => "#ef4444",
            Self::Medium => "#f59e0b",
            Self::Low => "#22c55e",
            Self::Blocked => "#6b7280",
            Self::Waiting => "#3b82f6",
        }
    }

    /// Icon and label, e.g. "🔴 High".
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {}", self.icon(), self.label())
    }

    /// Priority for a run of bangs: `!` low, `!!` medium, `!!!` high.
    #[must_use]
    pub const fn from_bang_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = NodeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_priority(s).ok_or_else(|| NodeSyntaxError::InvalidPriority(s.to_string()))
    }
}

/// Resolve a priority word, alias, digit or bang run.
///
/// A leading `!` is ignored unless the whole value is a bang run.
///
/// ```
/// use nodesyntax::core::{normalize_priority, Priority};
///
/// assert_eq!(normalize_priority("HI"), Some(Priority::High));
/// assert_eq!(normalize_priority("!p0"), Some(Priority::Critical));
/// assert_eq!(normalize_priority("!!"), Some(Priority::Medium));
/// assert_eq!(normalize_priority("someday"), None);
/// ```
#[must_use]
pub fn normalize_priority(input: &str) -> Option<Priority> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().all(|c| c == '!') {
        return Priority::from_bang_count(trimmed.len());
    }

    let word = trimmed.strip_prefix('!').unwrap_or(trimmed).to_lowercase();

    if let Some(level) = ALL.iter().find(|p| p.as_str() == word) {
        return Some(*level);
    }

    match word.as_str() {
        "1" => return Some(Priority::High),
        "2" => return Some(Priority::Medium),
        "3" => return Some(Priority::Low),
        _ => {},
    }

    PRIORITY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == word)
        .map(|(_, level)| *level)
}

/// Compare two priority strings for sorting, most pressing first.
///
/// Unknown values sort after every known level; two unknown values are equal.
#[must_use]
pub fn compare_priorities(a: &str, b: &str) -> Ordering {
    match (normalize_priority(a), normalize_priority(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
