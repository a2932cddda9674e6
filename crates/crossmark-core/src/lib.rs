//! # crossmark-core
//!
//! Core types, traits, and text utilities for crossmark.
//!
//! This crate provides the data model (market records, retrieval slots,
//! decisions, verifier state), the capability traits the matching pipeline
//! is written against, and the deterministic tokenization helpers shared by
//! retrieval and verification.

pub mod defaults;
pub mod env;
pub mod error;
pub mod logging;
pub mod models;
pub mod text;
pub mod traits;
pub mod venue;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use venue::{
    normalize_all, normalize_input, normalizer_for, KalshiNormalizer, PolymarketNormalizer,
};
