//! Tokenization and lexical similarity utilities.
//!
//! Everything here is pure and deterministic. The retriever, the heuristic
//! guard, the fast lane and the lexical fallback all tokenize the same way so
//! their scores are comparable.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("token pattern is valid"));

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern is valid"));

/// Aliases collapsed before entity comparison and fast-lane Jaccard.
pub const ALIASES: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("sol", "solana"),
    ("rep", "republican"),
    ("gop", "republican"),
    ("dem", "democrat"),
    ("dems", "democrat"),
    ("fed", "federal"),
    ("rate", "rates"),
];

/// Lowercase alphanumeric tokens, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Term-frequency counts for a token list.
pub fn term_counts<I, S>(tokens: I) -> HashMap<String, u32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.into()).or_insert(0) += 1;
    }
    counts
}

/// L2 norm of a term-frequency vector.
pub fn l2_norm(counts: &HashMap<String, u32>) -> f32 {
    counts
        .values()
        .map(|&c| (c as f32) * (c as f32))
        .sum::<f32>()
        .sqrt()
}

/// Four-digit years between 1900 and 2099 mentioned in `text`.
pub fn extract_years(text: &str) -> BTreeSet<u16> {
    YEAR_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// True when both sides name at least one year and no year is shared.
pub fn years_conflict(a: &BTreeSet<u16>, b: &BTreeSet<u16>) -> bool {
    !a.is_empty() && !b.is_empty() && a.is_disjoint(b)
}

/// Map a token through the alias table.
pub fn canonical(token: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, canon)| *canon)
        .unwrap_or(token)
}

/// Token set of `text` after alias normalization.
pub fn normalize_tokens(text: &str) -> HashSet<String> {
    tokenize(text)
        .into_iter()
        .map(|t| canonical(&t).to_string())
        .collect()
}

/// Jaccard index of two sets; 0.0 when either is empty.
pub fn set_jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.union(b).count();
    inter as f32 / union as f32
}

/// Jaccard similarity of two texts over alias-normalized token sets.
pub fn jaccard(a: &str, b: &str) -> f32 {
    set_jaccard(&normalize_tokens(a), &normalize_tokens(b))
}
