//! # crossmark-search
//!
//! Candidate retrieval for crossmark.
//!
//! This crate provides:
//! - An inverted-index lexical retriever (cosine over term frequencies)
//! - An embedding retriever (inner product over normalized vectors)
//! - [`Retriever`], the tagged choice between the two
//!
//! ## Example
//!
//! ```ignore
//! use crossmark_search::Retriever;
//!
//! let mut retriever = Retriever::lexical();
//! retriever.index(&right).await?;
//! let result = retriever.search(&left, 2).await?;
//! for pair in result.candidates() {
//!     println!("{} -> {} ({:.2})", pair.left_index, pair.right_index, pair.score);
//! }
//! ```

pub mod dense;
pub mod lexical;
pub mod retriever;

pub use dense::DenseIndex;
pub use lexical::LexicalIndex;
pub use retriever::{Retriever, RetrieverMode};

use crossmark_core::Neighbor;

/// Keep the `k` best `(doc, score)` pairs and pad the row to exactly `k` slots.
///
/// Scores sort descending; equal scores keep ascending document order.
pub(crate) fn select_top_k(mut scored: Vec<(usize, f32)>, k: usize) -> Vec<Neighbor> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);

    let mut row: Vec<Neighbor> = scored
        .into_iter()
        .map(|(doc, score)| Neighbor::new(doc, score))
        .collect();
    row.resize(k, Neighbor::EMPTY);
    row
}
