//! Color validation, normalization and manipulation.
//!
//! Accepts `#RGB`/`#RRGGBB` hex, `rgb()`/`rgba()`, `hsl()`/`hsla()` and a
//! small table of CSS color names.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::NodeSyntaxError;

/// CSS color names understood by the parser.
pub const NAMED_COLORS: &[(&str, &str)] = &[
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("orange", "#ffa500"),
    ("purple", "#800080"),
    ("pink", "#ffc0cb"),
    ("brown", "#a52a2a"),
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("cyan", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("lime", "#00ff00"),
    ("navy", "#000080"),
    ("teal", "#008080"),
    ("maroon", "#800000"),
    ("olive", "#808000"),
    ("silver", "#c0c0c0"),
    ("indigo", "#4b0082"),
    ("violet", "#ee82ee"),
    ("gold", "#ffd700"),
];

static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$")
        .unwrap_or_else(|e| panic!("Invalid hex color regex: {e}"))
});

static RGB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i)rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d*\.?\d+)\s*)?\)$",
    )
    .unwrap_or_else(|e| panic!("Invalid rgb color regex: {e}"))
});

static HSL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i)hsla?\(\s*(\d{1,3})\s*,\s*(\d{1,3})%\s*,\s*(\d{1,3})%\s*(?:,\s*(\d*\.?\d+)\s*)?\)$",
    )
    .unwrap_or_else(|e| panic!("Invalid hsl color regex: {e}"))
});

/// An opaque RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness in `0.0..=1.0`.
    #[must_use]
    pub fn luminance(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    fn map_channels(self, f: impl Fn(u8) -> u8) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = NodeSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_rgb(s).ok_or_else(|| NodeSyntaxError::InvalidColor(s.to_string()))
    }
}

/// Look up a named color's hex value.
#[must_use]
pub fn named_color_hex(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, hex)| *hex)
}

/// Check whether a string is a color the editor accepts.
///
/// ```
/// use nodesyntax::core::is_valid_color;
///
/// assert!(is_valid_color("#fff"));
/// assert!(is_valid_color("rgb(0,0,0)"));
/// assert!(is_valid_color("red"));
/// assert!(!is_valid_color("notacolor"));
/// ```
#[must_use]
pub fn is_valid_color(input: &str) -> bool {
    parse_color(input).is_some()
}

/// Normalize a color string.
///
/// Hex values are lowercased, named colors become their hex value, and
/// `rgb()`/`hsl()` forms have their whitespace removed. Returns `None` for
/// anything out of range or unrecognized.
#[must_use]
pub fn parse_color(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if HEX_PATTERN.is_match(trimmed) {
        return Some(trimmed.to_lowercase());
    }

    if let Some(hex) = named_color_hex(trimmed) {
        return Some(hex.to_string());
    }

    if let Some(caps) = RGB_PATTERN.captures(trimmed) {
        let channels = parse_components(&caps, [255, 255, 255])?;
        let alpha = parse_alpha(caps.get(4).map(|m| m.as_str()))?;
        return Some(functional_notation(trimmed, "rgb", &channels, alpha, ""));
    }

    if let Some(caps) = HSL_PATTERN.captures(trimmed) {
        let components = parse_components(&caps, [360, 100, 100])?;
        let alpha = parse_alpha(caps.get(4).map(|m| m.as_str()))?;
        return Some(functional_notation(trimmed, "hsl", &components, alpha, "%"));
    }

    None
}

/// Normalize a color for display: hex values are uppercased.
///
/// Unrecognized input is returned trimmed and unchanged.
#[must_use]
pub fn format_color_for_display(input: &str) -> String {
    match parse_color(input) {
        Some(color) if color.starts_with('#') => color.to_uppercase(),
        Some(color) => color,
        None => input.trim().to_string(),
    }
}

/// Blend each channel toward white by `percent` (0–100).
///
/// Unrecognized colors are returned unchanged.
#[must_use]
pub fn lighten_color(input: &str, percent: f64) -> String {
    let amount = percent.clamp(0.0, 100.0) / 100.0;
    to_rgb(input).map_or_else(
        || input.to_string(),
        |rgb| {
            rgb.map_channels(|c| blend(c, 255.0 - f64::from(c), amount))
                .to_hex()
        },
    )
}

/// Blend each channel toward black by `percent` (0–100).
///
/// Unrecognized colors are returned unchanged.
#[must_use]
pub fn darken_color(input: &str, percent: f64) -> String {
    let amount = percent.clamp(0.0, 100.0) / 100.0;
    to_rgb(input).map_or_else(
        || input.to_string(),
        |rgb| rgb.map_channels(|c| blend(c, -f64::from(c), amount)).to_hex(),
    )
}

/// Black or white, whichever reads better on top of `input`.
///
/// Unrecognized colors get black text.
#[must_use]
pub fn get_contrast_color(input: &str) -> &'static str {
    match to_rgb(input) {
        Some(rgb) if rgb.luminance() <= 0.5 => "#ffffff",
        _ => "#000000",
    }
}

/// Resolve any accepted color form to RGB. Alpha is dropped.
#[must_use]
pub fn to_rgb(input: &str) -> Option<Rgb> {
    let normalized = parse_color(input)?;

    if let Some(hex) = normalized.strip_prefix('#') {
        return hex_to_rgb(hex);
    }

    if let Some(caps) = RGB_PATTERN.captures(&normalized) {
        let [r, g, b] = parse_components(&caps, [255, 255, 255])?;
        return Some(Rgb::new(
            u8::try_from(r).ok()?,
            u8::try_from(g).ok()?,
            u8::try_from(b).ok()?,
        ));
    }

    let caps = HSL_PATTERN.captures(&normalized)?;
    let [h, s, l] = parse_components(&caps, [360, 100, 100])?;
    Some(hsl_to_rgb(f64::from(h), f64::from(s) / 100.0, f64::from(l) / 100.0))
}

// The result is clamped to the u8 range before the cast.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(channel: u8, delta: f64, amount: f64) -> u8 {
    delta
        .mul_add(amount, f64::from(channel))
        .round()
        .clamp(0.0, 255.0) as u8
}

fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
    let h_prime = (h % 360.0) / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h_prime {
        hp if hp < 1.0 => (c, x, 0.0),
        hp if hp < 2.0 => (x, c, 0.0),
        hp if hp < 3.0 => (0.0, c, x),
        hp if hp < 4.0 => (0.0, x, c),
        hp if hp < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_channel = |v: f64| blend(0, (v + m) * 255.0, 1.0);
    Rgb::new(to_channel(r1), to_channel(g1), to_channel(b1))
}

/// Parse the three numeric captures, rejecting any above its maximum.
fn parse_components(caps: &regex::Captures<'_>, max: [u16; 3]) -> Option<[u16; 3]> {
    let mut out = [0u16; 3];
    for (i, limit) in max.iter().enumerate() {
        let value: u16 = caps.get(i + 1)?.as_str().parse().ok()?;
        if value > *limit {
            return None;
        }
        out[i] = value;
    }
    Some(out)
}

#[allow(clippy::option_option)]
/// `Some(None)` when absent, `Some(Some(a))` when in `0..=1`, `None` when out of range.
fn parse_alpha(raw: Option<&str>) -> Option<Option<String>> {
    let Some(raw) = raw else {
        return Some(None);
    };
    let alpha: f64 = raw.parse().ok()?;
    if (0.0..=1.0).contains(&alpha) {
        Some(Some(raw.to_string()))
    } else {
        None
    }
}

fn functional_notation(
    original: &str,
    base: &str,
    components: &[u16; 3],
    alpha: Option<String>,
    unit: &str,
) -> String {
    // Keep the author's choice between `rgb(` and `rgba(`.
    let with_alpha_name = original.to_lowercase().starts_with(&format!("{base}a"));
    let name = if with_alpha_name || alpha.is_some() {
        format!("{base}a")
    } else {
        base.to_string()
    };

    let [a, b, c] = components;
    let mut parts = vec![a.to_string(), format!("{b}{unit}"), format!("{c}{unit}")];
    if let Some(alpha) = alpha {
        parts.push(alpha);
    }
    format!("{name}({})", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hex() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#FF00aa"));
        assert!(!is_valid_color("#ffff"));
        assert!(!is_valid_color("#ggg"));
        assert!(!is_valid_color("fff"));
    }

    #[test]
    fn test_valid_rgb() {
        assert!(is_valid_color("rgb(0,0,0)"));
        assert!(is_valid_color("rgb( 255 , 128 , 0 )"));
        assert!(is_valid_color("rgba(10, 20, 30, 0.5)"));
        assert!(!is_valid_color("rgb(256,0,0)"));
        assert!(!is_valid_color("rgba(0,0,0,1.5)"));
        assert!(!is_valid_color("rgb(0,0)"));
    }

    #[test]
    fn test_valid_hsl() {
        assert!(is_valid_color("hsl(120, 50%, 50%)"));
        assert!(is_valid_color("hsla(360,100%,0%,0.25)"));
        assert!(!is_valid_color("hsl(361, 50%, 50%)"));
        assert!(!is_valid_color("hsl(120, 101%, 50%)"));
        assert!(!is_valid_color("hsl(120, 50, 50)"));
    }

    #[test]
    fn test_valid_named() {
        assert!(is_valid_color("red"));
        assert!(is_valid_color("Grey"));
        assert!(!is_valid_color("notacolor"));
        assert!(!is_valid_color(""));
    }

    #[test]
    fn test_parse_color_normalizes() {
        assert_eq!(parse_color("RED").as_deref(), Some("#ff0000"));
        assert_eq!(parse_color("#ABCDEF").as_deref(), Some("#abcdef"));
        assert_eq!(parse_color("#FFF").as_deref(), Some("#fff"));
        assert_eq!(parse_color("rgb( 1, 2, 3 )").as_deref(), Some("rgb(1,2,3)"));
        assert_eq!(
            parse_color("RGBA(1, 2, 3, 0.5)").as_deref(),
            Some("rgba(1,2,3,0.5)")
        );
        assert_eq!(
            parse_color("hsl(120, 50%, 25%)").as_deref(),
            Some("hsl(120,50%,25%)")
        );
        assert_eq!(parse_color("nope"), None);
    }

    #[test]
    fn test_format_for_display() {
        assert_eq!(format_color_for_display("#ff0000"), "#FF0000");
        assert_eq!(format_color_for_display("blue"), "#0000FF");
        assert_eq!(format_color_for_display("rgb(1, 2, 3)"), "rgb(1,2,3)");
        assert_eq!(format_color_for_display(" junk "), "junk");
    }

    #[test]
    fn test_lighten_and_darken() {
        assert_eq!(lighten_color("#000000", 50.0), "#808080");
        assert_eq!(lighten_color("#ff0000", 100.0), "#ffffff");
        assert_eq!(darken_color("#ffffff", 50.0), "#808080");
        assert_eq!(darken_color("red", 100.0), "#000000");
        assert_eq!(darken_color("#fff", 0.0), "#ffffff");
        assert_eq!(lighten_color("bogus", 10.0), "bogus");
    }

    #[test]
    fn test_contrast_color() {
        assert_eq!(get_contrast_color("#ffffff"), "#000000");
        assert_eq!(get_contrast_color("yellow"), "#000000");
        assert_eq!(get_contrast_color("#000"), "#ffffff");
        assert_eq!(get_contrast_color("navy"), "#ffffff");
    }

    #[test]
    fn test_to_rgb_from_hsl() {
        assert_eq!(to_rgb("hsl(0, 100%, 50%)"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(to_rgb("hsl(120, 100%, 50%)"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(to_rgb("hsl(0, 0%, 100%)"), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_rgb_from_str() {
        let rgb: Rgb = "#0a0b0c".parse().unwrap();
        assert_eq!(rgb, Rgb::new(10, 11, 12));
        assert_eq!(rgb.to_string(), "#0a0b0c");
        assert_eq!(
            "xyz".parse::<Rgb>(),
            Err(NodeSyntaxError::InvalidColor("xyz".to_string()))
        );
    }
}
