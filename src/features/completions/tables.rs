//! Built-in suggestion tables.

use super::CompletionItem;
use crate::core::{Priority, PRIORITY_ALIASES};

pub(crate) const DATE_SUGGESTIONS: &[(&str, &str, &str)] = &[
    ("today", "Today", "Due today"),
    ("tomorrow", "Tomorrow", "Due tomorrow"),
    ("yesterday", "Yesterday", "Was due yesterday"),
    ("next-week", "Next week", "Seven days from today"),
    ("next-month", "Next month", "Same day next month"),
    ("eod", "End of day", "Today at 23:59"),
    ("eow", "End of week", "Next Sunday"),
    ("eom", "End of month", "Last day of this month"),
    ("monday", "Monday", "Next Monday"),
    ("tuesday", "Tuesday", "Next Tuesday"),
    ("wednesday", "Wednesday", "Next Wednesday"),
    ("thursday", "Thursday", "Next Thursday"),
    ("friday", "Friday", "Next Friday"),
    ("saturday", "Saturday", "Next Saturday"),
    ("sunday", "Sunday", "Next Sunday"),
];

/// Color picker palette: (name, swatch).
pub(crate) const PALETTE: &[(&str, &str)] = &[
    ("red", "#ef4444"),
    ("orange", "#f97316"),
    ("amber", "#f59e0b"),
    ("yellow", "#eab308"),
    ("lime", "#84cc16"),
    ("green", "#22c55e"),
    ("emerald", "#10b981"),
    ("teal", "#14b8a6"),
    ("cyan", "#06b6d4"),
    ("sky", "#0ea5e9"),
    ("blue", "#3b82f6"),
    ("indigo", "#6366f1"),
    ("violet", "#8b5cf6"),
    ("purple", "#a855f7"),
    ("fuchsia", "#d946ef"),
    ("pink", "#ec4899"),
    ("rose", "#f43f5e"),
    ("brown", "#92400e"),
    ("slate", "#64748b"),
    ("gray", "#6b7280"),
    ("zinc", "#71717a"),
    ("stone", "#78716c"),
    ("black", "#000000"),
    ("white", "#ffffff"),
];

pub(crate) const TAG_SUGGESTIONS: &[(&str, &str)] = &[
    ("urgent", "Needs attention now"),
    ("important", "High impact"),
    ("todo", "Something to do"),
    ("idea", "Worth exploring"),
    ("question", "Needs an answer"),
    ("bug", "Something is broken"),
    ("feature", "New functionality"),
    ("meeting", "Meeting notes"),
    ("followup", "Check back later"),
    ("review", "Needs review"),
    ("research", "Needs investigation"),
    ("decision", "A decision was made"),
    ("work", "Work related"),
    ("personal", "Personal"),
];

pub(crate) const ROLE_MENTIONS: &[(&str, &str)] = &[
    ("me", "Assign to yourself"),
    ("team", "Everyone on the team"),
    ("owner", "Map owner"),
    ("designer", "Design"),
    ("developer", "Engineering"),
    ("reviewer", "Reviewer"),
    ("manager", "Project manager"),
    ("qa", "Quality assurance"),
];

pub(crate) fn dates() -> Vec<CompletionItem> {
    DATE_SUGGESTIONS
        .iter()
        .map(|(value, label, description)| {
            CompletionItem::new(*value, *label, "date").with_description(*description)
        })
        .collect()
}

pub(crate) fn priorities() -> Vec<CompletionItem> {
    let levels = Priority::all()
        .iter()
        .map(|p| CompletionItem::new(p.as_str(), p.display(), "priority").with_description(p.color()));
    let aliases = PRIORITY_ALIASES.iter().map(|(alias, p)| {
        CompletionItem::new(*alias, format!("{alias} → {}", p.label()), "priority-alias")
            .with_description(p.as_str())
    });
    levels.chain(aliases).collect()
}

pub(crate) fn colors() -> Vec<CompletionItem> {
    PALETTE
        .iter()
        .map(|(name, hex)| CompletionItem::new(*hex, *name, "color").with_description(*hex))
        .collect()
}

pub(crate) fn tags() -> Vec<CompletionItem> {
    TAG_SUGGESTIONS
        .iter()
        .map(|(tag, description)| {
            CompletionItem::new(*tag, format!("#{tag}"), "tag").with_description(*description)
        })
        .collect()
}

/// Collaborators first, then role mentions not shadowed by a collaborator.
pub(crate) fn assignees(collaborators: &[String]) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = Vec::new();
    for name in collaborators {
        let name = name.trim().trim_start_matches('@');
        if name.is_empty() || items.iter().any(|i| i.value.eq_ignore_ascii_case(name)) {
            continue;
        }
        items.push(CompletionItem::new(name, format!("@{name}"), "collaborator"));
    }
    for (role, description) in ROLE_MENTIONS {
        if items.iter().any(|i| i.value.eq_ignore_ascii_case(role)) {
            continue;
        }
        items.push(CompletionItem::new(*role, format!("@{role}"), "role").with_description(*description));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::is_valid_color;

    #[test]
    fn test_palette_has_24_valid_swatches() {
        assert_eq!(PALETTE.len(), 24);
        assert!(colors().iter().all(|item| is_valid_color(&item.value)));
    }

    #[test]
    fn test_priorities_cover_levels_and_aliases() {
        let items = priorities();
        assert_eq!(items.len(), 8 + PRIORITY_ALIASES.len());
        assert_eq!(items[0].value, "asap");
        assert!(items.iter().any(|i| i.value == "p1" && i.category == "priority-alias"));
    }

    #[test]
    fn test_collaborators_shadow_roles() {
        let items = assignees(&["Sam".to_string(), "@team".to_string(), "sam".to_string()]);
        assert_eq!(items[0].value, "Sam");
        assert_eq!(items[1].value, "team");
        assert_eq!(items[1].category, "collaborator");
        assert_eq!(items.iter().filter(|i| i.value.eq_ignore_ascii_case("team")).count(), 1);
        assert_eq!(items.iter().filter(|i| i.value.eq_ignore_ascii_case("sam")).count(), 1);
    }
}
