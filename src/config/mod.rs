//! Configuration management for nodesyntax.
//!
//! This module handles loading and saving engine settings as YAML.

mod settings;

pub use settings::{CompletionConfig, Config, ValidationConfig};
