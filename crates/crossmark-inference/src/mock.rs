//! Mock verifier for deterministic testing.
//!
//! Returns scripted verdicts, keeps a call log and runs the same circuit
//! breaker as the real verifier so degraded-mode behavior can be exercised
//! without a network.
//!
//! ## Usage
//!
//! ```ignore
//! use crossmark_inference::mock::MockVerifier;
//!
//! let verifier = MockVerifier::new()
//!     .with_default_verdict(0.9, "same event")
//!     .with_verdict_for("Bitcoin above 100k", "BTC > 100k", 0.0, "different strike");
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crossmark_core::defaults::JUDGE_ERROR_LIMIT;
use crossmark_core::{MarketRecord, MatchVerifier, Verdict, VerifierState};

use crate::judge::ReplyError;
use crate::verifier::DISABLED_REASON;

/// Mock verifier for testing.
#[derive(Clone)]
pub struct MockVerifier {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    state: Arc<Mutex<VerifierState>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    default_verdict: Verdict,
    mappings: HashMap<(String, String), Verdict>,
    failing: bool,
}

/// One verification request that reached the mock's "network".
#[derive(Debug, Clone)]
pub struct MockCall {
    pub left_event: String,
    pub right_event: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_verdict: Verdict::reject("mock: no match"),
            mappings: HashMap::new(),
            failing: false,
        }
    }
}

impl MockVerifier {
    /// Create a mock that rejects everything.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(VerifierState::new(JUDGE_ERROR_LIMIT))),
        }
    }

    /// Verdict for pairs without a specific mapping.
    pub fn with_default_verdict(mut self, confidence: f32, reason: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_verdict = Verdict::new(confidence, reason);
        self
    }

    /// Verdict for one `(left.event, right.event)` pair.
    pub fn with_verdict_for(
        mut self,
        left_event: impl Into<String>,
        right_event: impl Into<String>,
        confidence: f32,
        reason: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config).mappings.insert(
            (left_event.into(), right_event.into()),
            Verdict::new(confidence, reason),
        );
        self
    }

    /// Make every call fail as if all endpoints returned garbage.
    pub fn failing(mut self) -> Self {
        Arc::make_mut(&mut self.config).failing = true;
        self
    }

    /// Consecutive failures before the breaker opens.
    pub fn with_error_limit(self, error_limit: u32) -> Self {
        *self.lock_state() = VerifierState::new(error_limit);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of calls that reached the mock's network path.
    pub fn call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn lock_state(&self) -> MutexGuard<'_, VerifierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn log_call(&self, left: &MarketRecord, right: &MarketRecord) {
        self.call_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockCall {
                left_event: left.event.clone(),
                right_event: right.event.clone(),
                timestamp: std::time::Instant::now(),
            });
    }
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchVerifier for MockVerifier {
    async fn verify(&self, left: &MarketRecord, right: &MarketRecord) -> Verdict {
        let mut state = self.lock_state();
        if !state.enabled {
            state.last_call_failed = true;
            return Verdict::reject(DISABLED_REASON);
        }
        self.log_call(left, right);

        if self.config.failing {
            state.record_failure();
            return Verdict::reject(ReplyError::Invalid.to_string());
        }

        state.record_success();
        self.config
            .mappings
            .get(&(left.event.clone(), right.event.clone()))
            .unwrap_or(&self.config.default_verdict)
            .clone()
    }

    fn state(&self) -> VerifierState {
        *self.lock_state()
    }
}
