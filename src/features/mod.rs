//! Engine features.
//!
//! - Pattern extraction
//! - Validation diagnostics
//! - Autocomplete
//! - Task lists
//! - Highlighting

pub mod completions;
pub mod extract;
pub mod highlight;
pub mod tasks;
pub mod validate;
