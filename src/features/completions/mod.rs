//! Autocomplete candidates for pattern triggers.
//!
//! Given the trigger under the cursor and what has been typed after it,
//! return a filtered, ranked list from the built-in tables. For `@` mentions
//! the host's collaborator list is merged in.

mod context;
mod tables;

use std::sync::Mutex;

use lru::LruCache;
use serde::Serialize;

use crate::config::CompletionConfig;
use crate::error::NodeSyntaxError;
use crate::features::extract::PatternType;

pub use context::{completion_context, CompletionContext};

/// One autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    /// Text inserted after the trigger.
    pub value: String,
    /// Text shown in the dropdown.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
}

impl CompletionItem {
    fn new(value: impl Into<String>, label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            description: None,
            category: category.into(),
        }
    }

    fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Which trigger is being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// `^`
    Date,
    /// `!`
    Priority,
    /// `color:`, `bg:`, `border:`
    Color,
    /// `#`
    Tag,
    /// `@`
    Assignee,
}

impl TriggerKind {
    /// The trigger that completes values of `pattern_type`, if any.
    #[must_use]
    pub const fn for_pattern(pattern_type: PatternType) -> Option<Self> {
        match pattern_type {
            PatternType::Date => Some(Self::Date),
            PatternType::Priority => Some(Self::Priority),
            PatternType::Color | PatternType::BackgroundColor | PatternType::BorderColor => {
                Some(Self::Color)
            },
            PatternType::Tag => Some(Self::Tag),
            PatternType::Assignee => Some(Self::Assignee),
            _ => None,
        }
    }
}

fn table(kind: TriggerKind, collaborators: &[String]) -> Vec<CompletionItem> {
    match kind {
        TriggerKind::Date => tables::dates(),
        TriggerKind::Priority => tables::priorities(),
        TriggerKind::Color => tables::colors(),
        TriggerKind::Tag => tables::tags(),
        TriggerKind::Assignee => tables::assignees(collaborators),
    }
}

/// Filter and rank a table.
///
/// Case-insensitive substring match on value or label. Items whose value or
/// label starts with the query come first; order is otherwise kept.
fn rank(items: Vec<CompletionItem>, query: &str, max_results: usize) -> Vec<CompletionItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.into_iter().take(max_results).collect();
    }

    let (prefix, substring): (Vec<_>, Vec<_>) = items
        .into_iter()
        .filter_map(|item| {
            let value = item.value.to_lowercase();
            let label = item.label.to_lowercase();
            if value.starts_with(&query) || label.starts_with(&query) {
                Some((true, item))
            } else if value.contains(&query) || label.contains(&query) {
                Some((false, item))
            } else {
                None
            }
        })
        .partition(|(is_prefix, _)| *is_prefix);

    prefix
        .into_iter()
        .chain(substring)
        .map(|(_, item)| item)
        .collect()
}

fn compute(
    kind: TriggerKind,
    query: &str,
    collaborators: &[String],
    max_results: usize,
) -> Vec<CompletionItem> {
    rank(table(kind, collaborators), query, max_results)
}

/// Completions from the built-in tables with default limits.
///
/// ```
/// use nodesyntax::features::completions::{get_completions, TriggerKind};
///
/// let items = get_completions(TriggerKind::Priority, "hi");
/// assert_eq!(items[0].value, "high");
/// assert!(get_completions(TriggerKind::Tag, "zzz").is_empty());
/// ```
#[must_use]
pub fn get_completions(kind: TriggerKind, query: &str) -> Vec<CompletionItem> {
    compute(kind, query, &[], CompletionConfig::default().max_results)
}

type CacheKey = (TriggerKind, String);

/// Completion lookups with an LRU cache in front.
///
/// The cache is keyed by `(trigger, query)` and never changes results.
pub struct CompletionProvider {
    config: CompletionConfig,
    collaborators: Vec<String>,
    cache: Mutex<LruCache<CacheKey, Vec<CompletionItem>>>,
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("config", &self.config)
            .field("collaborators", &self.collaborators.len())
            .finish_non_exhaustive()
    }
}

impl CompletionProvider {
    /// Create a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration has a zero capacity.
    pub fn new(config: CompletionConfig) -> Result<Self, NodeSyntaxError> {
        config.validate()?;
        let capacity = config.capacity()?;

        Ok(Self {
            config,
            collaborators: Vec::new(),
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Names offered for `@` mentions, ahead of the built-in roles.
    #[must_use]
    pub fn collaborators(&self) -> &[String] {
        &self.collaborators
    }

    /// Replace the collaborator list. Clears the cache.
    pub fn set_collaborators(&mut self, collaborators: Vec<String>) {
        self.collaborators = collaborators;
        self.cache
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
        tracing::debug!(count = self.collaborators.len(), "collaborators replaced");
    }

    /// Candidates for `query` typed after a `kind` trigger.
    #[must_use]
    pub fn complete(&self, kind: TriggerKind, query: &str) -> Vec<CompletionItem> {
        let key = (kind, query.trim().to_lowercase());

        let Ok(mut cache) = self.cache.lock() else {
            tracing::warn!("completion cache lock poisoned, computing uncached");
            return compute(kind, &key.1, &self.collaborators, self.config.max_results);
        };

        if let Some(items) = cache.get(&key) {
            tracing::trace!(?kind, query = %key.1, "completion cache hit");
            return items.clone();
        }

        tracing::trace!(?kind, query = %key.1, "completion cache miss");
        let items = compute(kind, &key.1, &self.collaborators, self.config.max_results);
        cache.put(key, items.clone());
        items
    }

    /// Number of cached queries.
    #[must_use]
    pub fn cached_queries(&self) -> usize {
        self.cache.lock().map_or(0, |cache| cache.len())
    }
}
