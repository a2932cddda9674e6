//! Structured logging field names for crossmark.
//!
//! The canonical list of `tracing` field names. Call sites write the names as
//! literals; they must match the constants here so that a run can be followed
//! end to end (retrieval → guard → judge → decision) by one set of keys.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Run-level failure, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (judge disabled, embedding tier lost) |
//! | INFO  | Run start/finish, accepted matches, run statistics |
//! | DEBUG | Per-candidate decisions (blocked, fast lane, judge required) |
//! | TRACE | Per-slot retrieval data, raw judge payloads |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID for one matching run.
/// Format: UUIDv7 (time-ordered).
pub const RUN_ID: &str = "run_id";

/// Component originating the log event.
/// Examples: "retriever", "guard", "judge", "fallback", "matcher"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "index", "search", "verify", "find_matches"
pub const OPERATION: &str = "op";

/// Venue a record or source belongs to.
pub const VENUE: &str = "venue";

// ─── Candidate fields ──────────────────────────────────────────────────────

/// Index of the left-hand record in its input list.
pub const LEFT_INDEX: &str = "left_index";

/// Index of the right-hand record in its input list.
pub const RIGHT_INDEX: &str = "right_index";

/// Retrieval similarity of a candidate pair.
pub const SCORE: &str = "score";

/// Token Jaccard similarity of a candidate pair.
pub const JACCARD: &str = "jaccard";

/// Final confidence of a verdict.
pub const CONFIDENCE: &str = "confidence";

/// Human-readable reason attached to a verdict.
pub const REASON: &str = "reason";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of documents indexed.
pub const DOC_COUNT: &str = "doc_count";

/// Number of queries issued to the retriever.
pub const QUERY_COUNT: &str = "query_count";

/// Number of candidate pairs after flattening.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of accepted decisions.
pub const MATCH_COUNT: &str = "match_count";

/// Number of verification calls skipped by shortcuts.
pub const SAVED_CALLS: &str = "saved_calls";

// ─── Judge fields ──────────────────────────────────────────────────────────

/// Model name used by the judge.
pub const MODEL: &str = "model";

/// Judge endpoint shape ("ollama_chat", "openai_completion", ...).
pub const ENDPOINT: &str = "endpoint";

/// Consecutive judge failures so far.
pub const CONSECUTIVE_ERRORS: &str = "consecutive_errors";

/// Byte length of a judge response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[&str] = &[
        RUN_ID,
        COMPONENT,
        OPERATION,
        VENUE,
        LEFT_INDEX,
        RIGHT_INDEX,
        SCORE,
        JACCARD,
        CONFIDENCE,
        REASON,
        DURATION_MS,
        DOC_COUNT,
        QUERY_COUNT,
        CANDIDATE_COUNT,
        MATCH_COUNT,
        SAVED_CALLS,
        MODEL,
        ENDPOINT,
        CONSECUTIVE_ERRORS,
        RESPONSE_LEN,
        SUCCESS,
        ERROR_MSG,
    ];

    #[test]
    fn test_field_names_are_unique() {
        let unique: HashSet<&str> = ALL.iter().copied().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn test_field_names_are_valid_literals() {
        // Must be writable as bare identifiers in `tracing` macros
        for name in ALL {
            assert!(!name.is_empty());
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }
    }
}
