//! Text normalization for matching across scripts and formats.
//!
//! BOM sheets arrive with mixed Simplified/Traditional Chinese, inconsistent
//! casing and stray whitespace. Matching is always done on normalized forms;
//! display strings keep whatever the source file used.

pub mod part;
pub mod zh;

pub use part::{format_quantity, is_probable_part_no, normalize_part_no, parse_quantity};
pub use zh::{to_simplified, to_traditional};

use std::collections::BTreeSet;

/// Canonical matching form: trimmed, lowercased, Simplified Chinese.
pub fn normalize_text(value: &str) -> String {
    let base = value.trim().to_lowercase();
    zh::to_simplified(&base)
}

/// All spellings of a value across the covered scripts.
///
/// Contains the trimmed lowercased base plus its Simplified and Traditional
/// renderings. Empty input yields an empty set.
pub fn normalized_variants(value: &str) -> BTreeSet<String> {
    let mut variants = BTreeSet::new();
    let base = value.trim().to_lowercase();
    if base.is_empty() {
        return variants;
    }
    variants.insert(zh::to_simplified(&base));
    variants.insert(zh::to_traditional(&base));
    variants.insert(base);
    variants
}
