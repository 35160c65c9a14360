//! One handle over extraction, validation and completion.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::core::{Clock, SystemClock};
use crate::error::NodeSyntaxError;
use crate::features::completions::{completion_context, CompletionItem, CompletionProvider};
use crate::features::extract::{ExtractionResult, Extractor};
use crate::features::highlight::{highlight, HighlightSpan};
use crate::features::validate::{DateConstraint, ValidationError, Validator};

/// Everything an editor needs per keystroke, sharing one config and clock.
///
/// ```
/// use nodesyntax::config::Config;
/// use nodesyntax::engine::Engine;
///
/// let engine = Engine::new(Config::default()).unwrap();
/// let result = engine.extract("Call @sam #work");
/// assert_eq!(result.clean_text, "Call");
/// assert!(engine.validate("Call @sam #work").is_empty());
/// ```
#[derive(Debug)]
pub struct Engine {
    config: Config,
    extractor: Extractor,
    validator: Validator,
    completions: CompletionProvider,
}

impl Engine {
    /// Build an engine on the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion settings are invalid.
    pub fn new(config: Config) -> Result<Self, NodeSyntaxError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build an engine reading dates from `clock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion settings are invalid.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, NodeSyntaxError> {
        let completions = CompletionProvider::new(config.completions.clone())?;
        let validator = Validator::new(config.validation.clone()).with_clock(Arc::clone(&clock));

        Ok(Self {
            config,
            extractor: Extractor::with_clock(clock),
            validator,
            completions,
        })
    }

    /// Build an engine from a YAML config file. A missing file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_config_file(path: &Path) -> Result<Self, NodeSyntaxError> {
        Self::new(Config::load_from_path(path)?)
    }

    /// Constrain `^date` values during validation.
    #[must_use]
    pub fn with_date_constraint(mut self, constraint: DateConstraint) -> Self {
        self.validator = self.validator.with_date_constraint(constraint);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the names offered for `@` mentions.
    pub fn set_collaborators(&mut self, collaborators: Vec<String>) {
        self.completions.set_collaborators(collaborators);
    }

    /// Extract patterns, metadata and clean text.
    #[must_use]
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.extractor.extract(text)
    }

    /// Diagnostics for `text`.
    #[must_use]
    pub fn validate(&self, text: &str) -> Vec<ValidationError> {
        self.validator.validate(text)
    }

    /// Decorations for `text`.
    #[must_use]
    pub fn highlight(&self, text: &str) -> Vec<HighlightSpan> {
        highlight(&self.extractor.extract(text))
    }

    /// Completions for the trigger ending at `cursor`, or nothing when the
    /// cursor is not inside one.
    #[must_use]
    pub fn complete(&self, text: &str, cursor: usize) -> Vec<CompletionItem> {
        completion_context(text, cursor)
            .map(|ctx| self.completions.complete(ctx.kind, &ctx.query))
            .unwrap_or_default()
    }

    /// The completion provider, for direct `(trigger, query)` lookups.
    #[must_use]
    pub const fn completions(&self) -> &CompletionProvider {
        &self.completions
    }
}
