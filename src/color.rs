//! Color identifier canonicalization and display formatting
//!
//! The canonical hex form is `#` followed by six hexadecimal digits. Case is
//! preserved in storage and compared case-insensitively; display surfaces
//! upper-case it.

/// Hex value substituted for provider codes that cannot be rendered
pub const FALLBACK_HEX: &str = "#000000";

fn is_hex_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Canonicalize a raw color code to `#RRGGBB`
///
/// Accepts six-digit codes with or without the `#` prefix and three-digit
/// shorthand (`#abc` becomes `#aabbcc`). Anything else is not renderable and
/// maps to [`FALLBACK_HEX`]. The result always starts with `#`, is seven
/// characters long, and normalizing it again returns it unchanged.
///
/// # Examples
/// ```rust
/// use palettegen::color::normalize_hex;
///
/// assert_eq!(normalize_hex("abc123"), "#abc123");
/// assert_eq!(normalize_hex("#DEF456"), "#DEF456");
/// assert_eq!(normalize_hex("#fa0"), "#ffaa00");
/// ```
#[must_use]
pub fn normalize_hex(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if is_hex_digits(digits, 6) {
        return format!("#{}", digits);
    }

    if is_hex_digits(digits, 3) {
        let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
        return format!("#{}", expanded);
    }

    log::warn!("Unrenderable color code '{}', using {}", raw, FALLBACK_HEX);
    FALLBACK_HEX.to_string()
}

/// Upper-cased canonical form used by every display and copy surface
#[must_use]
pub fn display_hex(hex: &str) -> String {
    normalize_hex(hex).to_uppercase()
}

/// Storage equality: two codes name the same color regardless of case or prefix
#[must_use]
pub fn hex_eq(a: &str, b: &str) -> bool {
    normalize_hex(a).eq_ignore_ascii_case(&normalize_hex(b))
}

/// Format a share percentage with exactly one decimal place
///
/// A zero (or missing) percentage renders as a bare `0`.
///
/// ```rust
/// use palettegen::color::format_percentage;
///
/// assert_eq!(format_percentage(12.34), "12.3");
/// assert_eq!(format_percentage(35.0), "35.0");
/// assert_eq!(format_percentage(0.0), "0");
/// ```
#[must_use]
pub fn format_percentage(percentage: f64) -> String {
    if percentage == 0.0 || !percentage.is_finite() {
        "0".to_string()
    } else {
        format!("{:.1}", percentage)
    }
}
