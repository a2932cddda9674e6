//! End-to-end matching pipeline.
//!
//! Index the right side, retrieve top-k per left record, rank all candidates
//! by score, then walk them greedily through the guard, the fast lane, the
//! external judge and, when the judge is degraded, the lexical fallback.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crossmark_core::text::jaccard;
use crossmark_core::{
    normalize_all, CandidatePair, DecisionPath, MarketRecord, MatchDecision, MatchReport,
    MatchStats, MatchVerifier, Normalizer, RetrievalResult, Verdict,
};
use crossmark_search::{Retriever, RetrieverMode};

use crate::config::MatcherConfig;
use crate::fallback::LexicalFallbackVerifier;
use crate::guard::HeuristicGuard;

/// Produces a fresh, empty retriever for each run.
pub type RetrieverFactory = Box<dyn Fn() -> Retriever + Send + Sync>;

/// Cross-venue market matcher.
///
/// Matching is greedy over the global score ranking: the highest-scoring
/// surviving candidate claims both of its records first. This is not a
/// maximum-weight bipartite assignment.
pub struct MarketMatcher {
    config: MatcherConfig,
    retriever_factory: RetrieverFactory,
    verifier: Arc<dyn MatchVerifier>,
    guard: HeuristicGuard,
    fallback: LexicalFallbackVerifier,
}

impl MarketMatcher {
    pub fn new<F>(
        config: MatcherConfig,
        retriever_factory: F,
        verifier: Arc<dyn MatchVerifier>,
    ) -> Self
    where
        F: Fn() -> Retriever + Send + Sync + 'static,
    {
        Self {
            config,
            retriever_factory: Box::new(retriever_factory),
            verifier,
            guard: HeuristicGuard::default(),
            fallback: LexicalFallbackVerifier::new(config.fallback),
        }
    }

    /// Lexical retrieval with default guard clusters.
    pub fn lexical(config: MatcherConfig, verifier: Arc<dyn MatchVerifier>) -> Self {
        Self::new(config, Retriever::lexical, verifier)
    }

    pub fn with_guard(mut self, guard: HeuristicGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn verifier(&self) -> &Arc<dyn MatchVerifier> {
        &self.verifier
    }

    /// Accepted decisions in acceptance order.
    pub async fn find_matches(
        &self,
        left: &[MarketRecord],
        right: &[MarketRecord],
    ) -> Vec<MatchDecision> {
        self.find_matches_with_report(left, right).await.decisions
    }

    /// Normalize raw venue payloads, then match.
    ///
    /// Payloads that already carry an `event` field are taken as normalized;
    /// payloads the normalizer cannot interpret are dropped.
    pub async fn find_matches_raw(
        &self,
        left: &[Value],
        left_normalizer: &dyn Normalizer,
        right: &[Value],
        right_normalizer: &dyn Normalizer,
    ) -> MatchReport {
        let left = normalize_all(left, left_normalizer);
        let right = normalize_all(right, right_normalizer);
        self.find_matches_with_report(&left, &right).await
    }

    /// Match and return decisions with run counters.
    pub async fn find_matches_with_report(
        &self,
        left: &[MarketRecord],
        right: &[MarketRecord],
    ) -> MatchReport {
        let run_id = Uuid::now_v7();
        let span = info_span!("match_run", run_id = %run_id, component = "matcher");
        self.run(run_id, left, right).instrument(span).await
    }

    async fn run(
        &self,
        run_id: Uuid,
        left: &[MarketRecord],
        right: &[MarketRecord],
    ) -> MatchReport {
        let start = Instant::now();
        if left.is_empty() || right.is_empty() {
            debug!(
                left_count = left.len(),
                right_count = right.len(),
                "Nothing to match"
            );
            return MatchReport::empty(run_id);
        }

        info!(
            left_count = left.len(),
            right_count = right.len(),
            top_k = self.config.top_k,
            "Match run started"
        );

        let retrieval = self.retrieve(left, right).await;
        let mut candidates = retrieval.candidates();
        // Stable: equal scores keep (left, rank) order
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut report = MatchReport::empty(run_id);
        report.stats.candidates = candidates.len();
        debug!(candidate_count = candidates.len(), "Candidates ranked");

        let mut left_taken = HashSet::new();
        let mut right_taken = HashSet::new();

        for candidate in candidates {
            let CandidatePair {
                score,
                left_index,
                right_index,
            } = candidate;
            let (Some(l), Some(r)) = (left.get(left_index), right.get(right_index)) else {
                continue;
            };

            if left_taken.contains(&left_index)
                || right_taken.contains(&right_index)
                || score < self.config.auto_reject
            {
                report.stats.saved_calls += 1;
                continue;
            }

            if let Some(veto) = self.guard.check(l, r) {
                debug!(
                    left_index,
                    right_index,
                    score,
                    reason = %veto,
                    "Candidate blocked"
                );
                report.stats.blocked += 1;
                report.stats.saved_calls += 1;
                continue;
            }

            let decision = self
                .decide(l, r, score, left_index, right_index, &mut report.stats)
                .await;
            let Some(decision) = decision else {
                continue;
            };

            info!(
                left_index,
                right_index,
                score,
                confidence = decision.confidence,
                path = %decision.path,
                reason = %decision.reason,
                "Match accepted"
            );
            left_taken.insert(left_index);
            right_taken.insert(right_index);
            report.decisions.push(decision);
        }

        report.stats.accepted = report.decisions.len();
        let stats = report.stats;
        info!(
            match_count = stats.accepted,
            candidate_count = stats.candidates,
            blocked = stats.blocked,
            fast_lane = stats.fast_lane,
            judged = stats.judged,
            fallback_accepts = stats.fallback_accepts,
            saved_calls = stats.saved_calls,
            duration_ms = start.elapsed().as_millis() as u64,
            "Match run finished"
        );
        report
    }

    /// Run one guarded candidate through the fast lane, judge and fallback.
    async fn decide(
        &self,
        left: &MarketRecord,
        right: &MarketRecord,
        score: f32,
        left_index: usize,
        right_index: usize,
        stats: &mut MatchStats,
    ) -> Option<MatchDecision> {
        let decision = |verdict: Verdict, path: DecisionPath| MatchDecision {
            left: left.clone(),
            right: right.clone(),
            confidence: verdict.confidence,
            reason: verdict.reason,
            retrieval_score: score,
            path,
        };

        if score >= self.config.auto_accept {
            let overlap = jaccard(&left.text(), &right.text());
            if overlap >= self.config.jaccard_min_fast_lane {
                debug!(left_index, right_index, score, jaccard = overlap, "Fast lane");
                stats.fast_lane += 1;
                stats.saved_calls += 1;
                let verdict = Verdict::new(
                    score,
                    format!("fast lane (score={:.2}, jaccard={:.2})", score, overlap),
                );
                return Some(decision(verdict, DecisionPath::FastLane));
            }
            debug!(
                left_index,
                right_index,
                score,
                jaccard = overlap,
                "Fast lane overlap too low, judging"
            );
        }

        debug!(left_index, right_index, score, "Judge required");
        if self.verifier.state().enabled {
            stats.judged += 1;
        }
        let mut verdict = self.verifier.verify(left, right).await;
        let mut path = DecisionPath::Judge;

        let state = self.verifier.state();
        if state.degraded() && verdict.confidence < self.config.accept_confidence {
            let fallback = self.fallback.verify(left, right, score);
            debug!(
                left_index,
                right_index,
                score,
                confidence = fallback.confidence,
                reason = %fallback.reason,
                judge_enabled = state.enabled,
                "Lexical fallback consulted"
            );
            if fallback.confidence >= self.config.accept_confidence {
                stats.fallback_accepts += 1;
                verdict = fallback;
                path = DecisionPath::Fallback;
            }
        }

        if verdict.confidence >= self.config.accept_confidence {
            Some(decision(verdict, path))
        } else {
            debug!(
                left_index,
                right_index,
                score,
                confidence = verdict.confidence,
                reason = %verdict.reason,
                "Candidate rejected"
            );
            None
        }
    }

    /// Index `right` and search it with `left`.
    ///
    /// An embedding failure degrades the run to lexical retrieval. If even
    /// that fails the run proceeds with no candidates.
    async fn retrieve(&self, left: &[MarketRecord], right: &[MarketRecord]) -> RetrievalResult {
        let k = self.config.top_k;
        let mut retriever = (self.retriever_factory)();
        let mode = retriever.mode();

        match search_with(&mut retriever, left, right, k).await {
            Ok(result) => return result,
            Err(e) if mode == RetrieverMode::Embedding => {
                warn!(
                    component = "retriever",
                    error = %e,
                    "Embedding retrieval failed, falling back to lexical"
                );
            }
            Err(e) => {
                error!(component = "retriever", error = %e, "Retrieval failed");
                return RetrievalResult::empty(left.len(), k);
            }
        }

        let mut lexical = Retriever::lexical();
        match search_with(&mut lexical, left, right, k).await {
            Ok(result) => result,
            Err(e) => {
                error!(component = "retriever", error = %e, "Lexical retrieval failed");
                RetrievalResult::empty(left.len(), k)
            }
        }
    }
}

async fn search_with(
    retriever: &mut Retriever,
    left: &[MarketRecord],
    right: &[MarketRecord],
    k: usize,
) -> crossmark_core::Result<RetrievalResult> {
    retriever.index(right).await?;
    retriever.search(left, k).await
}
