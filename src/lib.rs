//! nodesyntax - inline micro-syntax for mind-map note editors
//!
//! This crate turns text like `Review PR ^tomorrow !!! #urgent color:#ff0000`
//! into clean text plus structured metadata, reports malformed or incomplete
//! syntax as diagnostics, and offers autocomplete candidates for triggers.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod features;

pub use config::Config;
pub use engine::Engine;
pub use error::NodeSyntaxError;
pub use features::extract::{extract_all, ExtractionResult, PatternMatch, PatternType};
pub use features::validate::{validate_input, ValidationError};
