//! End-to-end matching scenarios.
//!
//! Each test drives [`MarketMatcher`] over lexical retrieval with a
//! deterministic [`MockVerifier`] standing in for the judge.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crossmark_core::{
    DecisionPath, EmbeddingBackend, Error, KalshiNormalizer, MarketRecord, MatchVerifier,
    PolymarketNormalizer, Result, Vector,
};
use crossmark_inference::MockVerifier;
use crossmark_matcher::{MarketMatcher, MatcherConfig, Retriever};

// ============================================================================
// HELPERS
// ============================================================================

fn matcher(verifier: &MockVerifier) -> MarketMatcher {
    MarketMatcher::lexical(MatcherConfig::default(), Arc::new(verifier.clone()))
}

fn fed_left() -> MarketRecord {
    MarketRecord::new("Fed rate hike in 2025?", "")
        .with_source("Polymarket")
        .with_id("fed-rate-hike-in-2025")
}

fn fed_right() -> MarketRecord {
    MarketRecord::new("Fed Rate Hike 2025", "federal funds rate increases")
        .with_source("Kalshi")
        .with_id("KXFEDHIKE-25")
}

/// Embedding backend whose host is down.
struct UnreachableEmbedder;

#[async_trait]
impl EmbeddingBackend for UnreachableEmbedder {
    async fn embed_texts(&self, _texts: &[String]) -> Result<Vec<Vector>> {
        Err(Error::Embedding("connection refused".to_string()))
    }

    fn dimension(&self) -> usize {
        384
    }

    fn model_name(&self) -> &str {
        "unreachable"
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_fed_pair_accepted_on_judge_confidence() {
    let verifier = MockVerifier::new().with_default_verdict(0.9, "same FOMC decision");
    let decisions = matcher(&verifier)
        .find_matches(&[fed_left()], &[fed_right()])
        .await;

    assert_eq!(decisions.len(), 1);
    let decision = &decisions[0];
    assert!((decision.confidence - 0.9).abs() < 1e-6);
    assert_eq!(decision.path, DecisionPath::Judge);
    assert_eq!(decision.left, fed_left());
    assert_eq!(decision.right, fed_right());
    assert!(decision.retrieval_score >= 0.6 && decision.retrieval_score < 0.88);
    assert_eq!(verifier.call_count(), 1);
}

#[tokio::test]
async fn test_year_mismatch_never_matches() {
    let verifier = MockVerifier::new().with_default_verdict(1.0, "always yes");
    let left = vec![MarketRecord::new("Will the Fed hike rates in 2025?", "")];
    let right = vec![MarketRecord::new("Will the Fed hike rates in 2050?", "")];

    let report = matcher(&verifier)
        .find_matches_with_report(&left, &right)
        .await;

    assert!(report.decisions.is_empty());
    assert_eq!(report.stats.blocked, 1);
    assert_eq!(verifier.call_count(), 0);
}

#[tokio::test]
async fn test_entity_cluster_conflict_never_matches() {
    let verifier = MockVerifier::new().with_default_verdict(1.0, "always yes");
    let left = vec![MarketRecord::new("Will Bitcoin reach $150k by December?", "")];
    let right = vec![MarketRecord::new("Will Ethereum reach $150k by December?", "")];

    let report = matcher(&verifier)
        .find_matches_with_report(&left, &right)
        .await;

    assert!(report.decisions.is_empty());
    assert_eq!(report.stats.blocked, 1);
    assert_eq!(verifier.call_count(), 0);
}

#[tokio::test]
async fn test_each_record_used_at_most_once() {
    let verifier = MockVerifier::new().with_default_verdict(0.95, "same");
    let left = vec![
        MarketRecord::new("Bitcoin above 100k in 2025?", "").with_id("l1"),
        MarketRecord::new("Will Bitcoin be above 100k in 2025?", "").with_id("l2"),
        MarketRecord::new("Bitcoin above 100k by end of 2025?", "").with_id("l3"),
    ];
    let right = vec![
        MarketRecord::new("Bitcoin above 100k in 2025", "").with_id("r1"),
        MarketRecord::new("Bitcoin above 100k by end of 2025", "").with_id("r2"),
    ];

    let report = matcher(&verifier)
        .find_matches_with_report(&left, &right)
        .await;

    assert!(!report.decisions.is_empty());
    assert!(report.decisions.len() <= 2);
    let mut lefts = HashSet::new();
    let mut rights = HashSet::new();
    for decision in &report.decisions {
        assert!(lefts.insert(decision.left.key().to_string()));
        assert!(rights.insert(decision.right.key().to_string()));
    }
    // Decisions come out in descending retrieval score
    let scores: Vec<f32> = report.decisions.iter().map(|d| d.retrieval_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let verifier = MockVerifier::new().with_default_verdict(0.8, "same");
    let m = matcher(&verifier);
    let left = vec![
        fed_left(),
        MarketRecord::new("Bitcoin above 100k in 2025?", ""),
    ];
    let right = vec![
        MarketRecord::new("Bitcoin above 100k in 2025", ""),
        fed_right(),
    ];

    let first = m.find_matches(&left, &right).await;
    let second = m.find_matches(&left, &right).await;

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_open_breaker_hands_off_to_fallback() {
    let verifier = MockVerifier::new().failing().with_error_limit(2);
    let years = [2025, 2026, 2027];
    let left: Vec<_> = years
        .iter()
        .map(|y| MarketRecord::new(format!("Fed rate hike in {}?", y), ""))
        .collect();
    let right: Vec<_> = years
        .iter()
        .map(|y| {
            MarketRecord::new(
                format!("Fed Rate Hike {}", y),
                "federal funds rate increases",
            )
        })
        .collect();

    let report = matcher(&verifier)
        .find_matches_with_report(&left, &right)
        .await;

    // Two calls trip the breaker; the third never reaches the network
    assert_eq!(verifier.call_count(), 2);
    let state = verifier.state();
    assert!(!state.enabled);
    assert_eq!(state.consecutive_errors, 2);

    assert_eq!(report.decisions.len(), 3);
    assert_eq!(report.stats.judged, 2);
    assert_eq!(report.stats.fallback_accepts, 3);
    for decision in &report.decisions {
        assert_eq!(decision.path, DecisionPath::Fallback);
        assert!(decision.confidence >= 0.7 && decision.confidence <= 0.92);
        assert!(decision.reason.starts_with("Fallback accepted (domain+year"));
    }
}

#[tokio::test]
async fn test_fallback_ignored_while_judge_healthy() {
    let verifier = MockVerifier::new().with_default_verdict(0.2, "different condition");
    let report = matcher(&verifier)
        .find_matches_with_report(&[fed_left()], &[fed_right()])
        .await;

    assert!(report.decisions.is_empty());
    assert_eq!(report.stats.fallback_accepts, 0);
}

#[tokio::test]
async fn test_low_overlap_skips_fast_lane() {
    let verifier = MockVerifier::new().with_default_verdict(0.75, "judged");
    let left = vec![MarketRecord::new(
        "rate rate rate rate rate rate rate rate rate rate alpha",
        "",
    )];
    let right = vec![MarketRecord::new(
        "rate rate rate rate rate rate rate rate rate rate beta gamma",
        "",
    )];

    let report = matcher(&verifier)
        .find_matches_with_report(&left, &right)
        .await;

    assert_eq!(report.decisions.len(), 1);
    assert!(report.decisions[0].retrieval_score >= 0.88);
    assert_eq!(report.decisions[0].path, DecisionPath::Judge);
    assert_eq!(report.stats.fast_lane, 0);
    assert_eq!(verifier.call_count(), 1);
}

#[tokio::test]
async fn test_raw_payloads_are_normalized_first() {
    let verifier = MockVerifier::new().with_default_verdict(0.9, "same");
    let polymarket = vec![
        json!({
            "question": "Fed rate hike in 2025?",
            "slug": "fed-rate-hike-in-2025",
            "description": null
        }),
        json!(42),
    ];
    let kalshi = vec![json!({
        "title": "Fed rate hike in 2025?",
        "rules_primary": "Resolves Yes if the Fed raises rates.",
        "ticker": "KXFEDHIKE-25"
    })];

    let report = matcher(&verifier)
        .find_matches_raw(&polymarket, &PolymarketNormalizer, &kalshi, &KalshiNormalizer)
        .await;

    assert_eq!(report.decisions.len(), 1);
    let decision = &report.decisions[0];
    assert_eq!(decision.left.key(), "fed-rate-hike-in-2025");
    assert_eq!(decision.left.source, "Polymarket");
    assert_eq!(decision.right.key(), "KXFEDHIKE-25");
    assert_eq!(decision.right.url, "https://kalshi.com/markets/KXFEDHIKE-25");
}

#[tokio::test]
async fn test_embedding_failure_degrades_to_lexical() {
    let verifier = MockVerifier::new().with_default_verdict(0.9, "same");
    let m = MarketMatcher::new(
        MatcherConfig::default(),
        || Retriever::embedding(Arc::new(UnreachableEmbedder)),
        Arc::new(verifier.clone()),
    );

    let decisions = m.find_matches(&[fed_left()], &[fed_right()]).await;

    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].path, DecisionPath::Judge);
}

#[tokio::test]
async fn test_run_ids_are_unique() {
    let verifier = MockVerifier::new();
    let m = matcher(&verifier);
    let a = m.find_matches_with_report(&[fed_left()], &[]).await;
    let b = m.find_matches_with_report(&[fed_left()], &[]).await;
    assert_ne!(a.run_id, b.run_id);
}
