//! # crossmark-inference
//!
//! Remote inference for crossmark: the LLM judge that verifies candidate
//! pairs and the Ollama embedding backend used by embedding retrieval.
//!
//! The judge is reached through a chain of compatible endpoints
//! (`/api/chat`, `/api/generate`, `/v1/chat/completions`, `/v1/completions`)
//! and guarded by a circuit breaker that disables it after repeated failures.
//!
//! ## Example
//!
//! ```ignore
//! use crossmark_inference::{ExternalVerifier, JudgeConfig};
//! use crossmark_core::MatchVerifier;
//!
//! let verifier = ExternalVerifier::new(&JudgeConfig::from_env())?;
//! let verdict = verifier.verify(&left, &right).await;
//! println!("{:.2}: {}", verdict.confidence, verdict.reason);
//! ```

pub mod config;
pub mod judge;
pub mod ollama;
pub mod transport;
pub mod verifier;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{ConfigError, EmbedConfig, JudgeConfig};
pub use judge::{parse_judge_reply, JudgeEndpoint, JudgeReply, ReplyError};
pub use ollama::OllamaEmbedder;
pub use transport::{HttpJudgeTransport, JudgeTransport};
pub use verifier::{ExternalVerifier, DISABLED_REASON};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockVerifier;
