//! Core formatters shared by the extractor, validators and completions.
//!
//! Date, priority and color normalization live here, along with the
//! [`Clock`] abstraction that pins "now" for relative dates.

pub mod color;
mod datetime;
mod priority;
mod traits;

pub use color::{
    darken_color, format_color_for_display, get_contrast_color, is_valid_color, lighten_color,
    named_color_hex, parse_color, to_rgb, Rgb, NAMED_COLORS,
};
pub use datetime::{
    date_to_iso, format_date_for_display, parse_date_string, parse_date_string_at, weekday_name,
};
pub use priority::{compare_priorities, normalize_priority, Priority, PRIORITY_ALIASES};
#[cfg(test)]
pub use traits::MockClock;
pub use traits::{Clock, FixedClock, SystemClock};
