//! Centralized default constants for crossmark.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration structs in the other crates start from these and let the
//! environment override them.

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Number of nearest right-hand records retrieved per left-hand record.
pub const TOP_K: usize = 2;

// =============================================================================
// DECISION THRESHOLDS
// =============================================================================

/// Retrieval score at or above which a pair may skip the judge (fast lane).
pub const AUTO_ACCEPT_THRESHOLD: f32 = 0.88;

/// Retrieval score below which a pair is dropped without verification.
pub const AUTO_REJECT_THRESHOLD: f32 = 0.60;

/// Minimum token Jaccard over title+description required for the fast lane.
pub const FAST_LANE_MIN_JACCARD: f32 = 0.30;

/// Minimum final confidence for a pair to be accepted.
pub const ACCEPT_CONFIDENCE: f32 = 0.70;

// =============================================================================
// LEXICAL FALLBACK
// =============================================================================

/// Domain+year rule: minimum retrieval similarity.
pub const FALLBACK_DOMAIN_MIN_SIMILARITY: f32 = 0.55;

/// Domain+year rule: minimum token Jaccard.
pub const FALLBACK_DOMAIN_MIN_JACCARD: f32 = 0.25;

/// Domain+year rule: minimum number of shared domain keywords.
pub const FALLBACK_DOMAIN_MIN_KEYWORDS: usize = 2;

/// Domain+year rule: confidence ceiling.
pub const FALLBACK_DOMAIN_CAP: f32 = 0.92;

/// Strict rule: minimum retrieval similarity.
pub const FALLBACK_STRICT_MIN_SIMILARITY: f32 = 0.62;

/// Strict rule: minimum token Jaccard.
pub const FALLBACK_STRICT_MIN_JACCARD: f32 = 0.36;

/// Strict rule: confidence ceiling.
pub const FALLBACK_STRICT_CAP: f32 = 0.90;

// =============================================================================
// JUDGE
// =============================================================================

/// Default judge base URL (local Ollama).
pub const JUDGE_URL: &str = "http://127.0.0.1:11434";

/// Default judge model name.
pub const JUDGE_MODEL: &str = "llama3";

/// Timeout per judge attempt in seconds.
pub const JUDGE_TIMEOUT_SECS: u64 = 60;

/// Consecutive failed judge calls before the judge is disabled for the run.
pub const JUDGE_ERROR_LIMIT: u32 = 3;

/// Sampling temperature sent to the judge.
pub const JUDGE_TEMPERATURE: f32 = 0.1;

/// Maximum tokens the judge may generate.
pub const JUDGE_MAX_TOKENS: u32 = 64;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "all-minilm";

/// Default embedding vector dimension for all-minilm.
pub const EMBED_DIMENSION: usize = 384;

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Maximum texts sent in a single embedding request.
pub const EMBED_BATCH_SIZE: usize = 64;
