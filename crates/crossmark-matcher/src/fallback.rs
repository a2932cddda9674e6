//! Lexical fallback verifier.
//!
//! Scores a pair from token overlap and the retrieval similarity alone, with
//! no network call. The matcher consults it only when the external judge is
//! disabled or its last call failed.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crossmark_core::text::{extract_years, years_conflict};
use crossmark_core::{MarketRecord, Verdict};

use crate::config::FallbackThresholds;

/// Domain synonyms collapsed to one token before comparison, applied in order.
static SYNONYMS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"federal\s+funds?\s+rate", "fedfundsrate"),
        (r"\bfed(?:eral)?\s+rate\b", "fedfundsrate"),
        (r"\bincrease(?:s|d)?\b", "hike"),
        (r"\braise(?:s|d)?\b", "hike"),
        (r"\bhike(?:s|d)?\b", "hike"),
    ]
    .into_iter()
    .map(|(pattern, canon)| (Regex::new(pattern).expect("synonym pattern is valid"), canon))
    .collect()
});

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("word pattern is valid"));

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "to", "of", "in", "on", "and", "or", "will", "be", "if", "for",
    "with", "by", "at", "as", "this", "that", "it", "next",
];

/// Keywords whose shared presence lowers the acceptance bar.
const DOMAIN_KEYWORDS: &[&str] = &[
    "fed",
    "federal",
    "fedfundsrate",
    "funds",
    "rate",
    "hike",
    "increase",
    "interest",
    "cut",
    "raise",
];

pub const INSUFFICIENT_TEXT_REASON: &str = "Insufficient text for fallback";
pub const YEAR_MISMATCH_REASON: &str = "Year mismatch";

fn canonical_text(lower: &str) -> String {
    SYNONYMS
        .iter()
        .fold(lower.to_string(), |text, (re, canon)| {
            re.replace_all(&text, *canon).into_owned()
        })
}

fn content_tokens(lower: &str) -> HashSet<String> {
    let text = canonical_text(lower);
    WORD_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|t| !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Deterministic confidence estimate from lexical evidence.
#[derive(Debug, Clone, Default)]
pub struct LexicalFallbackVerifier {
    thresholds: FallbackThresholds,
}

impl LexicalFallbackVerifier {
    pub fn new(thresholds: FallbackThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FallbackThresholds {
        &self.thresholds
    }

    /// Score `left` against `right`, where `similarity` is the retrieval
    /// score of the pair.
    ///
    /// Two acceptance rules apply. The domain rule needs a shared year,
    /// enough shared domain keywords, and moderate overlap. The strict rule
    /// needs higher overlap and similarity but no keywords. Anything else is
    /// a zero-confidence rejection.
    pub fn verify(&self, left: &MarketRecord, right: &MarketRecord, similarity: f32) -> Verdict {
        let left_text = left.text().to_lowercase();
        let right_text = right.text().to_lowercase();
        if left_text.is_empty() || right_text.is_empty() {
            return Verdict::reject(INSUFFICIENT_TEXT_REASON);
        }

        let left_tokens = content_tokens(&left_text);
        let right_tokens = content_tokens(&right_text);
        let union = left_tokens.union(&right_tokens).count();
        let shared: HashSet<&String> = left_tokens.intersection(&right_tokens).collect();
        let jaccard = if union == 0 {
            0.0
        } else {
            shared.len() as f32 / union as f32
        };

        let left_years = extract_years(&left_text);
        let right_years = extract_years(&right_text);
        if years_conflict(&left_years, &right_years) {
            return Verdict::reject(YEAR_MISMATCH_REASON);
        }
        let years_shared = !left_years.is_disjoint(&right_years);

        let keywords = shared
            .iter()
            .filter(|t| DOMAIN_KEYWORDS.contains(&t.as_str()))
            .count();

        let t = &self.thresholds;
        if years_shared
            && keywords >= t.domain_min_keywords
            && similarity >= t.domain_min_similarity
            && jaccard >= t.domain_min_jaccard
        {
            let span = (1.0 - t.domain_min_similarity).max(f32::EPSILON);
            let confidence = (0.72 + 0.2 * (similarity - t.domain_min_similarity) / span + 0.1)
                .min(t.domain_cap);
            return Verdict::new(
                confidence,
                format!(
                    "Fallback accepted (domain+year, jacc={:.2}, sim={:.2})",
                    jaccard, similarity
                ),
            );
        }

        if jaccard >= t.strict_min_jaccard && similarity >= t.strict_min_similarity {
            let span = (1.0 - t.strict_min_similarity).max(f32::EPSILON);
            let year_bonus = if years_shared { 0.05 } else { 0.0 };
            let confidence = (0.7 + 0.2 * (similarity - t.strict_min_similarity) / span
                + year_bonus)
                .min(t.strict_cap);
            return Verdict::new(
                confidence,
                format!(
                    "Fallback accepted (jacc={:.2}, sim={:.2})",
                    jaccard, similarity
                ),
            );
        }

        Verdict::reject(format!(
            "Fallback rejected (jacc={:.2}, sim={:.2})",
            jaccard, similarity
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> LexicalFallbackVerifier {
        LexicalFallbackVerifier::default()
    }

    fn fed_pair() -> (MarketRecord, MarketRecord) {
        (
            MarketRecord::new("Fed rate hike in 2025?", ""),
            MarketRecord::new("Fed Rate Hike 2025", "federal funds rate increases"),
        )
    }

    #[test]
    fn test_synonyms_collapse() {
        let tokens = content_tokens("federal funds rate increases next year");
        assert!(tokens.contains("fedfundsrate"));
        assert!(tokens.contains("hike"));
        assert!(!tokens.contains("next"));
        assert!(!tokens.contains("increases"));
    }

    #[test]
    fn test_domain_rule_accepts_fed_pair() {
        let (left, right) = fed_pair();
        let verdict = verifier().verify(&left, &right, 0.7);
        assert!(verdict.reason.starts_with("Fallback accepted (domain+year"));
        assert!((verdict.confidence - 0.8867).abs() < 1e-3);
        assert!(verdict.confidence <= 0.92);
    }

    #[test]
    fn test_domain_rule_is_capped() {
        let (left, right) = fed_pair();
        let verdict = verifier().verify(&left, &right, 1.0);
        assert!((verdict.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn test_year_mismatch_rejects() {
        let left = MarketRecord::new("Fed rate hike in 2025?", "");
        let right = MarketRecord::new("Fed rate hike in 2026?", "");
        let verdict = verifier().verify(&left, &right, 0.95);
        assert_eq!(verdict, Verdict::reject(YEAR_MISMATCH_REASON));
    }

    #[test]
    fn test_empty_text_rejects() {
        let verdict = verifier().verify(
            &MarketRecord::new("", ""),
            &MarketRecord::new("Fed", ""),
            0.9,
        );
        assert_eq!(verdict.reason, INSUFFICIENT_TEXT_REASON);
        assert_eq!(verdict.confidence, 0.0);
    }

    #[test]
    fn test_strict_rule_without_keywords() {
        let left = MarketRecord::new("Lakers win the championship", "");
        let right = MarketRecord::new("Will the Lakers win the championship?", "");
        let verdict = verifier().verify(&left, &right, 0.81);
        assert!(verdict.reason.starts_with("Fallback accepted (jacc="));
        // 0.7 + 0.2 * 0.19 / 0.38 = 0.8, no year bonus
        assert!((verdict.confidence - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_low_similarity_rejects() {
        let left = MarketRecord::new("Lakers win the championship", "");
        let right = MarketRecord::new("Lakers win the championship", "");
        let verdict = verifier().verify(&left, &right, 0.5);
        assert_eq!(verdict.confidence, 0.0);
        assert!(verdict.reason.starts_with("Fallback rejected"));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = FallbackThresholds {
            strict_min_similarity: 0.4,
            ..FallbackThresholds::default()
        };
        let left = MarketRecord::new("Lakers win the championship", "");
        let verdict = LexicalFallbackVerifier::new(thresholds).verify(&left, &left, 0.5);
        assert!(verdict.confidence >= 0.7);
    }
}
