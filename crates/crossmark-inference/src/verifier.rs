//! External judge verifier with endpoint fallback and a circuit breaker.
//!
//! Each call walks the endpoint chain until one returns a well-formed reply.
//! Only a call where every endpoint failed counts toward the breaker; once
//! `error_limit` such calls happen in a row the verifier stays disabled.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crossmark_core::{MarketRecord, MatchVerifier, Result, Verdict, VerifierState};

use crate::config::JudgeConfig;
use crate::judge::{build_match_prompt, parse_judge_reply, JudgeEndpoint, SYSTEM_PROMPT};
use crate::transport::{HttpJudgeTransport, JudgeTransport};

/// Verdict reason while the breaker is open.
pub const DISABLED_REASON: &str = "verifier disabled";

/// LLM-backed [`MatchVerifier`].
pub struct ExternalVerifier {
    transport: Option<Arc<dyn JudgeTransport>>,
    endpoints: Vec<JudgeEndpoint>,
    state: Mutex<VerifierState>,
}

impl ExternalVerifier {
    /// Build an HTTP-backed verifier from `config`.
    pub fn new(config: &JudgeConfig) -> Result<Self> {
        let transport = HttpJudgeTransport::new(config)?;
        info!(
            component = "judge",
            model = %config.model,
            base_url = %config.base_url,
            endpoints = config.endpoints.len(),
            error_limit = config.error_limit,
            "Initializing external verifier"
        );
        Ok(Self::with_transport(
            Arc::new(transport),
            config.endpoints.clone(),
            config.error_limit,
        ))
    }

    /// Build a verifier over an arbitrary transport.
    pub fn with_transport(
        transport: Arc<dyn JudgeTransport>,
        endpoints: Vec<JudgeEndpoint>,
        error_limit: u32,
    ) -> Self {
        Self {
            transport: Some(transport),
            endpoints,
            state: Mutex::new(VerifierState::new(error_limit)),
        }
    }

    /// A verifier whose breaker is open from the start. Used when no judge is
    /// configured; every call falls through to the lexical fallback.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            endpoints: Vec::new(),
            state: Mutex::new(VerifierState::disabled()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, VerifierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_failure(&self, reason: &str) {
        let mut state = self.lock_state();
        let tripped = state.record_failure();
        if tripped {
            warn!(
                component = "judge",
                consecutive_errors = state.consecutive_errors,
                error_limit = state.error_limit,
                reason,
                "Judge repeatedly failing; disabling it for the rest of the run"
            );
        } else {
            debug!(
                component = "judge",
                consecutive_errors = state.consecutive_errors,
                reason,
                "Judge call failed on every endpoint"
            );
        }
    }
}

#[async_trait]
impl MatchVerifier for ExternalVerifier {
    async fn verify(&self, left: &MarketRecord, right: &MarketRecord) -> Verdict {
        let transport = {
            let mut state = self.lock_state();
            match &self.transport {
                Some(transport) if state.enabled => Arc::clone(transport),
                _ => {
                    state.last_call_failed = true;
                    return Verdict::reject(DISABLED_REASON);
                }
            }
        };

        let prompt = build_match_prompt(left, right);
        let mut last_reason = String::from("no judge endpoints configured");

        for &endpoint in &self.endpoints {
            match transport.complete(endpoint, SYSTEM_PROMPT, &prompt).await {
                Ok(text) => match parse_judge_reply(&text) {
                    Ok(reply) => {
                        self.lock_state().record_success();
                        debug!(
                            component = "judge",
                            endpoint = %endpoint,
                            is_match = reply.is_match,
                            confidence = reply.confidence,
                            reason = %reply.reason,
                            "Judge verdict"
                        );
                        return Verdict::new(reply.match_confidence(), reply.reason);
                    }
                    Err(e) => {
                        debug!(
                            component = "judge",
                            endpoint = %endpoint,
                            response_len = text.len(),
                            error = %e,
                            "Unusable judge reply; trying next endpoint"
                        );
                        last_reason = e.to_string();
                    }
                },
                Err(e) => {
                    debug!(
                        component = "judge",
                        endpoint = %endpoint,
                        model = transport.model_name(),
                        error = %e,
                        "Judge endpoint failed; trying next endpoint"
                    );
                    last_reason = format!("judge unavailable: {}", e);
                }
            }
        }

        self.record_failure(&last_reason);
        Verdict::reject(last_reason)
    }

    fn state(&self) -> VerifierState {
        *self.lock_state()
    }
}
