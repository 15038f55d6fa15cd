//! Blocked-requester matching.
//!
//! The blocklist is a free-form text file of names separated by whitespace or
//! punctuation. Requester cells in the raw export pack several names into one
//! cell, so matching runs per token, and every comparison goes through both
//! Chinese scripts.

use crate::text::normalized_variants;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

static TOKEN_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s,;，；/、|]+").unwrap_or_else(|e| panic!("invalid token pattern: {e}"))
});

static LIST_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s,;，；]+").unwrap_or_else(|e| panic!("invalid list pattern: {e}"))
});

const TOKEN_TRIM: &[char] = &['(', ')', '（', '）', '[', ']', '【', '】', '\'', '"'];

/// Matches requester names against a blocklist across script variants.
///
/// Two-character names are common enough to collide, so a two-character
/// token only matches when the blocklist entry itself had two characters.
#[derive(Debug, Default)]
pub struct BlockedMatcher {
    variant_lengths: HashMap<String, HashSet<usize>>,
}

impl BlockedMatcher {
    /// Loads the blocklist file. A missing file means nothing is blocked.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let mut matcher = Self::default();
        if !path.exists() {
            return Ok(matcher);
        }
        let content = std::fs::read_to_string(path)?;
        for token in LIST_SPLIT.split(&content) {
            matcher.add(token);
        }
        Ok(matcher)
    }

    pub fn add(&mut self, value: &str) {
        let cleaned = value.trim();
        if cleaned.is_empty() {
            return;
        }
        let length = cleaned.chars().count();
        for variant in normalized_variants(cleaned) {
            if variant.is_empty() {
                continue;
            }
            self.variant_lengths.entry(variant).or_default().insert(length);
        }
    }

    pub fn matches(&self, requester: &str) -> bool {
        if self.variant_lengths.is_empty() || requester.is_empty() {
            return false;
        }
        for token in split_requester_tokens(requester) {
            let token_length = token.chars().count();
            for variant in normalized_variants(&token) {
                let Some(lengths) = self.variant_lengths.get(&variant) else {
                    continue;
                };
                if token_length == 2 {
                    if lengths.contains(&2) {
                        return true;
                    }
                } else {
                    return true;
                }
            }
        }
        false
    }
}

fn split_requester_tokens(value: &str) -> Vec<String> {
    TOKEN_SPLIT
        .split(value)
        .map(|token| token.trim().trim_matches(TOKEN_TRIM))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
