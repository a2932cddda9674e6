//! Inverted-index lexical retrieval.
//!
//! Scores are cosine similarities between raw term-frequency vectors, computed
//! only over documents that share at least one token with the query. This is
//! an approximate top-k: documents outside the candidate union are never
//! scored.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crossmark_core::text::{l2_norm, term_counts, tokenize};
use crossmark_core::{MarketRecord, Neighbor};

use crate::select_top_k;

/// Term-frequency vector of one indexed document.
#[derive(Debug, Clone, Default)]
struct DocVector {
    counts: HashMap<String, u32>,
    norm: f32,
}

/// In-memory inverted index over one side's records.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    postings: HashMap<String, BTreeSet<usize>>,
    docs: Vec<DocVector>,
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents with `records`.
    pub fn build(&mut self, records: &[MarketRecord]) {
        self.postings.clear();
        self.docs = Vec::with_capacity(records.len());

        for (doc_id, record) in records.iter().enumerate() {
            let counts = term_counts(tokenize(&record.text()));
            for token in counts.keys() {
                self.postings
                    .entry(token.clone())
                    .or_default()
                    .insert(doc_id);
            }
            let norm = l2_norm(&counts);
            self.docs.push(DocVector { counts, norm });
        }

        debug!(
            component = "lexical_index",
            doc_count = self.docs.len(),
            vocabulary = self.postings.len(),
            "Built lexical index"
        );
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Score every document sharing a token with `text`. Zero-similarity
    /// documents are omitted.
    pub fn score(&self, text: &str) -> Vec<(usize, f32)> {
        let query = term_counts(tokenize(text));
        let query_norm = l2_norm(&query);
        if query_norm == 0.0 {
            return Vec::new();
        }

        let candidates: BTreeSet<usize> = query
            .keys()
            .filter_map(|token| self.postings.get(token))
            .flatten()
            .copied()
            .collect();

        candidates
            .into_iter()
            .filter_map(|doc_id| {
                let doc = &self.docs[doc_id];
                if doc.norm == 0.0 {
                    return None;
                }
                let dot: f32 = query
                    .iter()
                    .filter_map(|(token, &q)| doc.counts.get(token).map(|&d| (q * d) as f32))
                    .sum();
                let sim = (dot / (query_norm * doc.norm)).min(1.0);
                (sim > 0.0).then_some((doc_id, sim))
            })
            .collect()
    }

    /// Top-`k` neighbors for each query, padded to exactly `k` slots.
    pub fn search(&self, queries: &[MarketRecord], k: usize) -> Vec<Vec<Neighbor>> {
        debug!(
            component = "lexical_index",
            query_count = queries.len(),
            k,
            "Searching lexical index"
        );
        queries
            .iter()
            .map(|q| select_top_k(self.score(&q.text()), k))
            .collect()
    }
}
