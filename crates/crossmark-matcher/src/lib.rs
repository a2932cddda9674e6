//! # crossmark-matcher
//!
//! Decides which markets on two venues describe the same event.
//!
//! This crate provides:
//! - [`MarketMatcher`]: retrieval, greedy ranking and tiered verification
//! - [`HeuristicGuard`]: year and entity-cluster veto
//! - [`LexicalFallbackVerifier`]: offline confidence when the judge is degraded
//! - [`MatcherConfig`]: thresholds with environment overrides
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crossmark_inference::{ExternalVerifier, JudgeConfig};
//! use crossmark_matcher::{MarketMatcher, MatcherConfig};
//!
//! let verifier = ExternalVerifier::new(&JudgeConfig::from_env())?;
//! let matcher = MarketMatcher::lexical(MatcherConfig::from_env(), Arc::new(verifier));
//!
//! for decision in matcher.find_matches(&polymarket, &kalshi).await {
//!     println!("{} <-> {} ({:.2})", decision.left.event, decision.right.event, decision.confidence);
//! }
//! ```

pub mod config;
pub mod fallback;
pub mod guard;
pub mod orchestrator;

// Re-export core types
pub use crossmark_core::*;

pub use config::{FallbackThresholds, MatcherConfig};
pub use fallback::LexicalFallbackVerifier;
pub use guard::{HeuristicGuard, Veto, DEFAULT_CLUSTERS};
pub use orchestrator::{MarketMatcher, RetrieverFactory};
pub use crossmark_search::{Retriever, RetrieverMode};
