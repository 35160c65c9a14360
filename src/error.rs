//! Error types for nodesyntax.
//!
//! Engine operations (extraction, validation, completion) never fail: bad
//! input is reported as [`crate::features::validate::ValidationError`]
//! diagnostics. This enum covers the setup paths that can.

use thiserror::Error;

/// Errors raised while configuring the engine or converting values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeSyntaxError {
    /// Configuration could not be read, parsed or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// A string could not be interpreted as a color.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A string does not name a known priority level.
    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    /// A date value or date constraint is not usable.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}
