//! Retrieval strategy selection.
//!
//! The strategy is chosen once, when the [`Retriever`] is constructed. Both
//! variants answer the same `search` contract: exactly `k` slots per query,
//! score descending, padding slots last.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crossmark_core::{EmbeddingBackend, MarketRecord, Result, RetrievalResult};

use crate::dense::DenseIndex;
use crate::lexical::LexicalIndex;

/// Which retrieval strategy a [`Retriever`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverMode {
    Lexical,
    Embedding,
}

impl std::fmt::Display for RetrieverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Embedding => write!(f, "embedding"),
        }
    }
}

/// Index over the right-hand records plus its top-k query path.
#[derive(Debug)]
pub enum Retriever {
    Lexical(LexicalIndex),
    Embedding(DenseIndex),
}

impl Retriever {
    /// Token-overlap retrieval; always available.
    pub fn lexical() -> Self {
        Self::Lexical(LexicalIndex::new())
    }

    /// Vector retrieval through `backend`.
    pub fn embedding(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self::Embedding(DenseIndex::new(backend))
    }

    pub fn mode(&self) -> RetrieverMode {
        match self {
            Self::Lexical(_) => RetrieverMode::Lexical,
            Self::Embedding(_) => RetrieverMode::Embedding,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        match self {
            Self::Lexical(index) => index.len(),
            Self::Embedding(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the index over `records`, replacing any previous contents.
    ///
    /// Only the embedding variant can fail.
    #[instrument(skip_all, fields(mode = %self.mode(), doc_count = records.len()))]
    pub async fn index(&mut self, records: &[MarketRecord]) -> Result<()> {
        match self {
            Self::Lexical(index) => {
                index.build(records);
                Ok(())
            }
            Self::Embedding(index) => index.build(records).await,
        }
    }

    /// Top-`k` neighbors for every query record.
    ///
    /// Each row holds exactly `k` slots. Slots beyond the available matches
    /// are [`Neighbor::EMPTY`](crossmark_core::Neighbor::EMPTY).
    #[instrument(skip_all, fields(mode = %self.mode(), query_count = queries.len(), k = k))]
    pub async fn search(&self, queries: &[MarketRecord], k: usize) -> Result<RetrievalResult> {
        let neighbors = match self {
            Self::Lexical(index) => index.search(queries, k),
            Self::Embedding(index) => index.search(queries, k).await?,
        };
        Ok(RetrievalResult { neighbors })
    }
}
