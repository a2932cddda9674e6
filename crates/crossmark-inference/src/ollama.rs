//! Ollama embedding backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crossmark_core::{EmbeddingBackend, Error, Result, Vector};

use crate::config::EmbedConfig;

/// Timeout for the reachability probe (seconds).
const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Ollama `/api/embed` client.
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
    timeout_secs: u64,
}

impl OllamaEmbedder {
    /// Create an embedder with custom configuration.
    pub fn with_config(config: &EmbedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Ollama embedder: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Create from `CROSSMARK_EMBED_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(&EmbedConfig::from_env())
    }

    /// Probe `/api/tags`. Unreachable or non-2xx hosts report `false`.
    pub async fn health_check(&self) -> bool {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Ollama health check passed");
                true
            }
            Ok(resp) => {
                warn!("Ollama health check failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("Ollama health check error: {}", e);
                false
            }
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingBackend for OllamaEmbedder {
    #[instrument(skip(self, texts), fields(component = "ollama", op = "embed_texts", model = %self.model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            result_count = result.embeddings.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > 5000 {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(result.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(base_url: &str) -> OllamaEmbedder {
        OllamaEmbedder::with_config(&EmbedConfig {
            base_url: base_url.to_string(),
            ..EmbedConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_embedding_request_serialization() {
        let input = vec!["a".to_string(), "b".to_string()];
        let request = EmbeddingRequest {
            model: "all-minilm",
            input: &input,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "all-minilm");
        assert_eq!(json["input"][1], "b");
    }

    #[tokio::test]
    async fn test_embed_texts_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(serde_json::json!({"model": "all-minilm"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2], [0.3, 0.4]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vectors = embedder(&server.uri())
            .embed_texts(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert!((vectors[1][0] - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_embed_texts_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let err = embedder(&server.uri())
            .embed_texts(&["a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let server = MockServer::start().await;
        let vectors = embedder(&server.uri()).embed_texts(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .mount(&server)
            .await;
        assert!(embedder(&server.uri()).health_check().await);
        assert!(!embedder("http://127.0.0.1:9").health_check().await);
    }
}
