//! Network transport for judge requests.
//!
//! [`JudgeTransport`] is the seam between the circuit breaker and the wire:
//! the verifier only sees "text came back" or "this attempt failed".

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crossmark_core::{Error, Result};

use crate::config::JudgeConfig;
use crate::judge::{JudgeEndpoint, RequestParams};

/// Sends one prompt to one endpoint and returns the judge's answer text.
#[async_trait]
pub trait JudgeTransport: Send + Sync {
    async fn complete(&self, endpoint: JudgeEndpoint, system: &str, user: &str) -> Result<String>;

    /// Model name used for logging.
    fn model_name(&self) -> &str;
}

/// reqwest-backed transport.
pub struct HttpJudgeTransport {
    client: Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
    timeout_secs: u64,
    temperature: f32,
    max_tokens: u32,
}

impl HttpJudgeTransport {
    pub fn new(config: &JudgeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_token: config.api_token.clone(),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, endpoint: JudgeEndpoint) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(endpoint.url(&self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs));

        if let Some(ref token) = self.api_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        req.header("Content-Type", "application/json")
    }
}

#[async_trait]
impl JudgeTransport for HttpJudgeTransport {
    #[instrument(skip(self, system, user), fields(component = "judge_transport", endpoint = %endpoint, model = %self.model))]
    async fn complete(&self, endpoint: JudgeEndpoint, system: &str, user: &str) -> Result<String> {
        let start = Instant::now();
        let params = RequestParams {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .build_request(endpoint)
            .json(&endpoint.payload(&params, system, user))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.timeout_secs)
                } else {
                    Error::Judge(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Judge(format!(
                "{} returned {}: {}",
                endpoint, status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Judge(format!("Failed to read response: {}", e)))?;
        let text = endpoint.extract_text(&body).ok_or_else(|| {
            Error::Judge(format!("{} returned an unexpected response shape", endpoint))
        })?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            duration_ms = elapsed,
            "Judge call complete"
        );
        if elapsed > 30000 {
            warn!(duration_ms = elapsed, slow = true, "Slow judge call");
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
