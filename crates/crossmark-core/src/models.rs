//! Data model shared by every crossmark crate.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// =============================================================================
// MARKET RECORDS
// =============================================================================

/// A single market listing normalized to the venue-independent shape.
///
/// Produced by a [`Normalizer`](crate::Normalizer) or a
/// [`MarketSource`](crate::MarketSource) and never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Market title as shown by the venue.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event: String,
    /// Resolution rules or long description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Venue identifier ("Polymarket", "Kalshi", ...).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    /// Public URL of the listing.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    /// Venue-specific identifier (slug, ticker) when the venue exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MarketRecord {
    pub fn new(event: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Title and description joined by a space, trimmed.
    pub fn text(&self) -> String {
        format!("{} {}", self.event, self.description)
            .trim()
            .to_string()
    }

    /// Stable key for persistence: the venue identifier, or the URL when the
    /// venue has none.
    pub fn key(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.url,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// RETRIEVAL TYPES
// =============================================================================

/// One retrieval slot: a right-hand document index and its similarity.
///
/// `index == None` is the padding slot used when the index holds fewer than
/// `k` matching documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub index: Option<usize>,
    pub score: f32,
}

impl Neighbor {
    /// Padding slot: no document, zero similarity.
    pub const EMPTY: Neighbor = Neighbor {
        index: None,
        score: 0.0,
    };

    pub fn new(index: usize, score: f32) -> Self {
        Self {
            index: Some(index),
            score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_none()
    }
}

/// Top-k neighbors for every query, in query order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub neighbors: Vec<Vec<Neighbor>>,
}

impl RetrievalResult {
    /// Build a result where every one of `queries` rows holds `k` padding slots.
    pub fn empty(queries: usize, k: usize) -> Self {
        Self {
            neighbors: vec![vec![Neighbor::EMPTY; k]; queries],
        }
    }

    /// Flatten filled slots into candidate pairs, dropping padding.
    pub fn candidates(&self) -> Vec<CandidatePair> {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(left_index, row)| {
                row.iter().filter_map(move |n| {
                    n.index.map(|right_index| CandidatePair {
                        score: n.score,
                        left_index,
                        right_index,
                    })
                })
            })
            .collect()
    }
}

/// A proposed correspondence between a left and a right record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub score: f32,
    pub left_index: usize,
    pub right_index: usize,
}

// =============================================================================
// DECISION TYPES
// =============================================================================

/// Which tier accepted a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    /// High retrieval score and lexical overlap; judge skipped.
    FastLane,
    /// External judge confirmed the pair.
    Judge,
    /// Judge unavailable; lexical fallback confirmed the pair.
    Fallback,
}

impl std::fmt::Display for DecisionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FastLane => write!(f, "fast_lane"),
            Self::Judge => write!(f, "judge"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A confirmed match produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDecision {
    pub left: MarketRecord,
    pub right: MarketRecord,
    pub confidence: f32,
    pub reason: String,
    /// Retrieval similarity the candidate was ranked by.
    pub retrieval_score: f32,
    pub path: DecisionPath,
}

/// Answer from a verifier: confidence in `[0, 1]` plus a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub confidence: f32,
    pub reason: String,
}

impl Verdict {
    pub fn new(confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }

    /// A zero-confidence verdict.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::new(0.0, reason)
    }
}

/// Snapshot of the external verifier's circuit-breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierState {
    pub enabled: bool,
    pub consecutive_errors: u32,
    pub error_limit: u32,
    pub last_call_failed: bool,
}

impl VerifierState {
    pub fn new(error_limit: u32) -> Self {
        Self {
            enabled: true,
            consecutive_errors: 0,
            error_limit,
            last_call_failed: false,
        }
    }

    /// A breaker that is open from the start.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            consecutive_errors: 0,
            error_limit: 0,
            last_call_failed: true,
        }
    }

    /// True when the caller should not trust the last judge answer alone.
    pub fn degraded(&self) -> bool {
        !self.enabled || self.last_call_failed
    }

    /// Record a well-formed judge answer.
    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
        self.last_call_failed = false;
    }

    /// Record a failed call. Returns true if this failure opened the breaker.
    pub fn record_failure(&mut self) -> bool {
        self.last_call_failed = true;
        if !self.enabled {
            return false;
        }
        self.consecutive_errors += 1;
        if self.consecutive_errors >= self.error_limit {
            self.enabled = false;
            return true;
        }
        false
    }
}

// =============================================================================
// RUN REPORTING
// =============================================================================

/// Counters describing one matching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Candidate pairs after dropping padding slots.
    pub candidates: usize,
    /// Pairs vetoed by the heuristic guard.
    pub blocked: usize,
    /// Pairs accepted without a judge call.
    pub fast_lane: usize,
    /// Judge calls issued.
    pub judged: usize,
    /// Pairs accepted on the lexical fallback's word.
    pub fallback_accepts: usize,
    /// Verification calls skipped by a shortcut.
    pub saved_calls: usize,
    /// Decisions returned.
    pub accepted: usize,
}

/// Result of a run: the decisions plus counters for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub run_id: Uuid,
    pub decisions: Vec<MatchDecision>,
    pub stats: MatchStats,
}

impl MatchReport {
    pub fn empty(run_id: Uuid) -> Self {
        Self {
            run_id,
            decisions: Vec::new(),
            stats: MatchStats::default(),
        }
    }
}

/// Embedding vector type.
pub type Vector = Vec<f32>;
