//! Core traits for crossmark abstractions.
//!
//! These traits define the seams between the matching pipeline and its
//! collaborators, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{MarketRecord, Vector, Verdict, VerifierState};

// =============================================================================
// SOURCE TRAITS
// =============================================================================

/// A venue that can list its open markets as normalized records.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Venue name used as the record `source`.
    fn name(&self) -> &str;

    /// Fetch the venue's current markets.
    async fn fetch_markets(&self) -> Result<Vec<MarketRecord>>;
}

/// Converts one raw venue payload into a [`MarketRecord`].
pub trait Normalizer: Send + Sync {
    /// Venue this normalizer understands.
    fn venue(&self) -> &str;

    /// Normalize a raw payload. Returns `None` for payloads that cannot be
    /// interpreted as a market.
    fn normalize(&self, raw: &serde_json::Value) -> Option<MarketRecord>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Decides whether two records describe the same real-world event.
///
/// `verify` does not fail: transport and protocol problems show up as a
/// zero-confidence verdict and in [`MatchVerifier::state`].
#[async_trait]
pub trait MatchVerifier: Send + Sync {
    async fn verify(&self, left: &MarketRecord, right: &MarketRecord) -> Verdict;

    /// Current circuit-breaker state.
    fn state(&self) -> VerifierState;
}
