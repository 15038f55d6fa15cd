//! Part number and quantity parsing helpers.

use regex::Regex;
use std::sync::LazyLock;

/// Uppercase alphanumerics plus the separators seen in real part numbers.
static PART_NO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9][A-Z0-9._/-]*$").unwrap_or_else(|e| panic!("invalid pattern: {}", e))
});

/// Numeric token inside a quantity cell, ignoring surrounding remarks.
static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?\d+(?:\.\d+)?").unwrap_or_else(|e| panic!("invalid pattern: {}", e))
});

/// Canonical key for a part number: uppercased with all whitespace removed.
pub fn normalize_part_no(value: &str) -> String {
    value
        .trim()
        .to_uppercase()
        .split_whitespace()
        .collect::<String>()
}

/// Whether a cell value is plausibly a part number rather than free text.
///
/// Requires the normalized value to match the part pattern and to contain at
/// least one digit and at least one letter, which filters out row numbers,
/// bare quantities and prose.
pub fn is_probable_part_no(value: &str) -> bool {
    let normalized = normalize_part_no(value);
    if normalized.is_empty() {
        return false;
    }
    if !PART_NO_PATTERN.is_match(&normalized) {
        return false;
    }
    if !normalized.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if !normalized.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    true
}

/// Extracts a quantity from a cell value.
///
/// Thousands separators are removed first, then the first numeric token is
/// taken so that cells like `约 1,200 pcs` still parse. Returns `None` when
/// the cell holds no number at all.
pub fn parse_quantity(value: &str) -> Option<f64> {
    let text = value.trim();
    if text.is_empty() {
        return None;
    }
    let normalized = text.replace(',', "");
    let token = QUANTITY_PATTERN.find(&normalized)?;
    let number: f64 = token.as_str().parse().ok()?;
    if number.is_nan() { None } else { Some(number) }
}

/// Renders a quantity the way it should appear in output tables: whole
/// numbers without a decimal point, fractions rounded to four places.
pub fn format_quantity(value: f64) -> String {
    if (value - value.round()).abs() <= 1e-6 {
        return format!("{}", value.round() as i64);
    }
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{}", rounded)
}

/// Whether a parsed quantity is effectively an integer.
pub fn is_integral(value: f64) -> bool {
    (value - value.round()).abs() <= 1e-6
}
