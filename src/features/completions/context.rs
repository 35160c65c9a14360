//! Locating the trigger under the cursor.

use serde::Serialize;

use super::TriggerKind;
use crate::features::validate::Span;

/// What the user is typing at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionContext {
    pub kind: TriggerKind,
    /// Text typed after the trigger, up to the cursor.
    pub query: String,
    /// From the trigger to the cursor. Accepting a completion replaces it.
    pub span: Span,
}

const KEYWORD_TRIGGERS: &[&str] = &["color:", "bg:", "border:"];

/// Find the completion trigger of the token ending at `cursor`.
///
/// `cursor` is a byte offset. Returns `None` when it is out of range, not on
/// a character boundary, or the token has no trigger.
///
/// ```
/// use nodesyntax::features::completions::{completion_context, TriggerKind};
///
/// let ctx = completion_context("Ship it ^tom", 12).unwrap();
/// assert_eq!(ctx.kind, TriggerKind::Date);
/// assert_eq!(ctx.query, "tom");
/// assert_eq!(ctx.span.start, 8);
/// ```
#[must_use]
pub fn completion_context(text: &str, cursor: usize) -> Option<CompletionContext> {
    if cursor > text.len() || !text.is_char_boundary(cursor) {
        return None;
    }

    let before = &text[..cursor];
    let token_start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let token = &before[token_start..];

    // Opening punctuation may sit in front of a sigil: `(@sam`.
    let trimmed = token.trim_start_matches(['(', '[', '{', '"', '\'']);
    let start = token_start + (token.len() - trimmed.len());

    let (kind, trigger_len) = match trimmed.chars().next()? {
        '^' => (TriggerKind::Date, 1),
        '!' => (TriggerKind::Priority, trimmed.len() - trimmed.trim_start_matches('!').len()),
        '#' => (TriggerKind::Tag, 1),
        '@' => (TriggerKind::Assignee, 1),
        _ => {
            let lower = trimmed.to_lowercase();
            let keyword = KEYWORD_TRIGGERS.iter().find(|k| lower.starts_with(*k))?;
            (TriggerKind::Color, keyword.len())
        },
    };

    Some(CompletionContext {
        kind,
        query: trimmed[trigger_len..].to_string(),
        span: Span::new(start, cursor),
    })
}
