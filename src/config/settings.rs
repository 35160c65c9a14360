//! Engine settings.
//!
//! Hosts can keep these in a YAML file; every field has a default, so a
//! partial or missing file is fine.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NodeSyntaxError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Validator settings.
    pub validation: ValidationConfig,
    /// Completion provider settings.
    pub completions: CompletionConfig,
}

/// Validator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Inputs shorter than this (after trimming) get no incomplete-pattern
    /// or bracket diagnostics.
    #[serde(default = "default_min_input_length")]
    pub min_input_length: usize,
    /// Values this short at the very end of the input are still being typed.
    #[serde(default = "default_trailing_fragment_length")]
    pub trailing_fragment_length: usize,
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompletionConfig {
    /// Number of `(trigger, query)` results kept in the LRU cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Items returned for an empty query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

// Default value functions for serde
const fn default_min_input_length() -> usize {
    3
}

const fn default_trailing_fragment_length() -> usize {
    2
}

const fn default_cache_capacity() -> usize {
    128
}

const fn default_max_results() -> usize {
    10
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_input_length: default_min_input_length(),
            trailing_fragment_length: default_trailing_fragment_length(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            max_results: default_max_results(),
        }
    }
}

impl CompletionConfig {
    /// Cache capacity as the LRU cache wants it.
    ///
    /// # Errors
    ///
    /// Returns an error if `cache_capacity` is zero.
    pub fn capacity(&self) -> Result<NonZeroUsize, NodeSyntaxError> {
        NonZeroUsize::new(self.cache_capacity).ok_or_else(|| {
            NodeSyntaxError::Config("completions.cache_capacity must be greater than 0".to_string())
        })
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if either capacity is zero.
    pub fn validate(&self) -> Result<(), NodeSyntaxError> {
        self.capacity()?;
        if self.max_results == 0 {
            return Err(NodeSyntaxError::Config(
                "completions.max_results must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the values are invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self, NodeSyntaxError> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|e| NodeSyntaxError::Config(format!("Failed to parse config: {e}")))?;
        config.completions.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, NodeSyntaxError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            NodeSyntaxError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_yaml_str(&contents).map_err(|e| match e {
            NodeSyntaxError::Config(msg) => {
                NodeSyntaxError::Config(format!("{}: {msg}", path.display()))
            },
            other => other,
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &Path) -> Result<(), NodeSyntaxError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| NodeSyntaxError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            NodeSyntaxError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }
}
