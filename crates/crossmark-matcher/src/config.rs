//! Matching thresholds.

use crossmark_core::defaults;
use crossmark_core::env::env_or;
use crossmark_core::{Error, Result};

/// Acceptance bars for the lexical fallback verifier.
///
/// The domain rule is tuned for interest-rate markets; both rules are kept
/// as plain numbers so other domains can retune them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackThresholds {
    pub domain_min_similarity: f32,
    pub domain_min_jaccard: f32,
    pub domain_min_keywords: usize,
    pub domain_cap: f32,
    pub strict_min_similarity: f32,
    pub strict_min_jaccard: f32,
    pub strict_cap: f32,
}

impl Default for FallbackThresholds {
    fn default() -> Self {
        Self {
            domain_min_similarity: defaults::FALLBACK_DOMAIN_MIN_SIMILARITY,
            domain_min_jaccard: defaults::FALLBACK_DOMAIN_MIN_JACCARD,
            domain_min_keywords: defaults::FALLBACK_DOMAIN_MIN_KEYWORDS,
            domain_cap: defaults::FALLBACK_DOMAIN_CAP,
            strict_min_similarity: defaults::FALLBACK_STRICT_MIN_SIMILARITY,
            strict_min_jaccard: defaults::FALLBACK_STRICT_MIN_JACCARD,
            strict_cap: defaults::FALLBACK_STRICT_CAP,
        }
    }
}

/// Configuration for one [`MarketMatcher`](crate::MarketMatcher).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Neighbors retrieved per left record.
    pub top_k: usize,
    /// Retrieval score at or above which the fast lane is considered.
    pub auto_accept: f32,
    /// Retrieval score below which a candidate is dropped unverified.
    pub auto_reject: f32,
    /// Minimum token Jaccard for a fast-lane accept.
    pub jaccard_min_fast_lane: f32,
    /// Final confidence needed to accept a judged pair.
    pub accept_confidence: f32,
    pub fallback: FallbackThresholds,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::TOP_K,
            auto_accept: defaults::AUTO_ACCEPT_THRESHOLD,
            auto_reject: defaults::AUTO_REJECT_THRESHOLD,
            jaccard_min_fast_lane: defaults::FAST_LANE_MIN_JACCARD,
            accept_confidence: defaults::ACCEPT_CONFIDENCE,
            fallback: FallbackThresholds::default(),
        }
    }
}

impl MatcherConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `CROSSMARK_TOP_K` | `2` | Neighbors per left record |
    /// | `CROSSMARK_AUTO_ACCEPT` | `0.88` | Fast-lane retrieval score |
    /// | `CROSSMARK_AUTO_REJECT` | `0.60` | Drop candidates below this score |
    /// | `CROSSMARK_FAST_LANE_JACCARD` | `0.30` | Fast-lane token overlap |
    /// | `CROSSMARK_ACCEPT_CONFIDENCE` | `0.70` | Final acceptance confidence |
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            top_k: env_or("CROSSMARK_TOP_K", default.top_k).max(1),
            auto_accept: env_or("CROSSMARK_AUTO_ACCEPT", default.auto_accept),
            auto_reject: env_or("CROSSMARK_AUTO_REJECT", default.auto_reject),
            jaccard_min_fast_lane: env_or(
                "CROSSMARK_FAST_LANE_JACCARD",
                default.jaccard_min_fast_lane,
            ),
            accept_confidence: env_or("CROSSMARK_ACCEPT_CONFIDENCE", default.accept_confidence),
            fallback: default.fallback,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_thresholds(mut self, auto_reject: f32, auto_accept: f32) -> Self {
        self.auto_reject = auto_reject;
        self.auto_accept = auto_accept;
        self
    }

    pub fn with_accept_confidence(mut self, confidence: f32) -> Self {
        self.accept_confidence = confidence;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackThresholds) -> Self {
        self.fallback = fallback;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        let unit = [
            ("auto_accept", self.auto_accept),
            ("auto_reject", self.auto_reject),
            ("jaccard_min_fast_lane", self.jaccard_min_fast_lane),
            ("accept_confidence", self.accept_confidence),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.auto_reject > self.auto_accept {
            return Err(Error::Config(format!(
                "auto_reject ({}) must not exceed auto_accept ({})",
                self.auto_reject, self.auto_accept
            )));
        }
        Ok(())
    }
}
