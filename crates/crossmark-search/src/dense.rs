//! Embedding-backed retrieval.
//!
//! Documents and queries are encoded by an [`EmbeddingBackend`], L2-normalized
//! and compared by inner product, so scores are cosine similarities. Negative
//! similarities are clamped to zero to keep scores in `[0, 1]`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crossmark_core::defaults::EMBED_BATCH_SIZE;
use crossmark_core::{EmbeddingBackend, Error, MarketRecord, Neighbor, Result, Vector};

use crate::select_top_k;

/// Flat inner-product index over normalized embeddings.
pub struct DenseIndex {
    backend: Arc<dyn EmbeddingBackend>,
    vectors: Vec<Vector>,
    batch_size: usize,
}

impl std::fmt::Debug for DenseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseIndex")
            .field("model", &self.backend.model_name())
            .field("docs", &self.vectors.len())
            .finish()
    }
}

impl DenseIndex {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            backend,
            vectors: Vec::new(),
            batch_size: EMBED_BATCH_SIZE,
        }
    }

    /// Set how many texts are sent to the backend per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Encode `records` and replace the index contents.
    pub async fn build(&mut self, records: &[MarketRecord]) -> Result<()> {
        let start = Instant::now();
        let texts: Vec<String> = records.iter().map(MarketRecord::text).collect();
        self.vectors = self.encode(&texts, None).await?;
        info!(
            component = "dense_index",
            model = self.backend.model_name(),
            doc_count = self.vectors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Built embedding index"
        );
        Ok(())
    }

    /// Top-`k` neighbors for each query, padded to exactly `k` slots.
    pub async fn search(&self, queries: &[MarketRecord], k: usize) -> Result<Vec<Vec<Neighbor>>> {
        if k == 0 || queries.is_empty() {
            return Ok(vec![Vec::new(); queries.len()]);
        }
        if self.vectors.is_empty() {
            return Ok(vec![vec![Neighbor::EMPTY; k]; queries.len()]);
        }

        let texts: Vec<String> = queries.iter().map(MarketRecord::text).collect();
        let encoded = self.encode(&texts, self.vectors.first().map(Vec::len)).await?;
        debug!(
            component = "dense_index",
            query_count = encoded.len(),
            k,
            "Searching embedding index"
        );

        Ok(encoded
            .iter()
            .map(|query| {
                let scored = self
                    .vectors
                    .iter()
                    .enumerate()
                    .map(|(doc_id, doc)| (doc_id, inner_product(query, doc).clamp(0.0, 1.0)))
                    .collect();
                select_top_k(scored, k)
            })
            .collect())
    }

    /// Embed `texts` in batches and L2-normalize the results.
    ///
    /// Every vector must share one dimension, `dimension` when given,
    /// otherwise that of the first vector returned.
    async fn encode(&self, texts: &[String], dimension: Option<usize>) -> Result<Vec<Vector>> {
        let mut dimension = dimension;
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.backend.embed_texts(batch).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "backend returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }
            for vector in vectors {
                let expected = *dimension.get_or_insert(vector.len());
                if vector.len() != expected {
                    return Err(Error::Embedding(format!(
                        "backend returned a {}-dimensional vector, expected {}",
                        vector.len(),
                        expected
                    )));
                }
                out.push(normalize(vector));
            }
        }
        Ok(out)
    }
}

/// Scale `v` to unit length. Zero vectors are returned unchanged.
pub fn normalize(mut v: Vector) -> Vector {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

/// Inner product of two vectors of equal dimension.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
