//! Integration tests for the judge endpoint fallback chain.
//!
//! These drive [`ExternalVerifier`] over real HTTP against a wiremock server
//! and check which endpoints are hit and how the circuit breaker moves.

use std::time::Duration;

use crossmark_core::{MarketRecord, MatchVerifier};
use crossmark_inference::{ExternalVerifier, JudgeConfig, DISABLED_REASON};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pair() -> (MarketRecord, MarketRecord) {
    (
        MarketRecord::new("Fed rate hike in 2025?", "").with_source("Polymarket"),
        MarketRecord::new("Fed Rate Hike 2025", "federal funds rate increases")
            .with_source("Kalshi"),
    )
}

fn config(server: &MockServer) -> JudgeConfig {
    JudgeConfig::default()
        .with_base_url(server.uri())
        .with_timeout_secs(5)
}

async fn mount_error(server: &MockServer, endpoint_path: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path(endpoint_path))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_primary_endpoint_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "llama3", "format": "json", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "role": "assistant",
                "content": "{\"reason\": \"same FOMC decision\", \"match\": true, \"confidence\": 0.9}"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_error(&server, "/api/generate", 0).await;

    let verifier = ExternalVerifier::new(&config(&server)).unwrap();
    let (left, right) = pair();
    let verdict = verifier.verify(&left, &right).await;

    assert!((verdict.confidence - 0.9).abs() < 1e-6);
    assert_eq!(verdict.reason, "same FOMC decision");
    assert!(!verifier.state().degraded());
}

#[tokio::test]
async fn test_openai_chat_rescues_failed_primaries() {
    let server = MockServer::start().await;
    mount_error(&server, "/api/chat", 1).await;
    mount_error(&server, "/api/generate", 1).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Answer: {\"match\": true, \"confidence\": 0.82, \"reason\": \"same\"}"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_error(&server, "/v1/completions", 0).await;

    let verifier = ExternalVerifier::new(&config(&server)).unwrap();
    let (left, right) = pair();
    let verdict = verifier.verify(&left, &right).await;

    assert!((verdict.confidence - 0.82).abs() < 1e-6);
    let state = verifier.state();
    assert_eq!(state.consecutive_errors, 0);
    assert!(!state.last_call_failed);
}

#[tokio::test]
async fn test_all_endpoints_failing_increments_once() {
    let server = MockServer::start().await;
    for p in ["/api/chat", "/api/generate", "/v1/chat/completions", "/v1/completions"] {
        mount_error(&server, p, 1).await;
    }

    let verifier = ExternalVerifier::new(&config(&server)).unwrap();
    let (left, right) = pair();
    let verdict = verifier.verify(&left, &right).await;

    assert_eq!(verdict.confidence, 0.0);
    assert!(verdict.reason.starts_with("judge unavailable"));
    let state = verifier.state();
    assert_eq!(state.consecutive_errors, 1);
    assert!(state.last_call_failed);
    assert!(state.enabled);
}

#[tokio::test]
async fn test_timeouts_count_as_one_failed_call() {
    let server = MockServer::start().await;
    for p in ["/api/chat", "/api/generate", "/v1/chat/completions", "/v1/completions"] {
        Mock::given(method("POST"))
            .and(path(p))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "{\"match\": true, \"confidence\": 1.0}"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let verifier = ExternalVerifier::new(&config(&server).with_timeout_secs(1)).unwrap();
    let (left, right) = pair();
    let verdict = verifier.verify(&left, &right).await;

    assert_eq!(verdict.confidence, 0.0);
    assert!(verdict.reason.contains("Timed out"));
    let state = verifier.state();
    assert_eq!(state.consecutive_errors, 1);
    assert!(state.last_call_failed);
    assert!(state.enabled);
}

#[tokio::test]
async fn test_breaker_opens_after_limit() {
    let server = MockServer::start().await;
    for p in ["/api/chat", "/api/generate", "/v1/chat/completions", "/v1/completions"] {
        // Two failing calls reach the network; the third is short-circuited
        mount_error(&server, p, 2).await;
    }

    let verifier = ExternalVerifier::new(&config(&server).with_error_limit(2)).unwrap();
    let (left, right) = pair();
    verifier.verify(&left, &right).await;
    verifier.verify(&left, &right).await;
    assert!(!verifier.state().enabled);

    let verdict = verifier.verify(&left, &right).await;
    assert_eq!(verdict.reason, DISABLED_REASON);
    assert_eq!(verdict.confidence, 0.0);
}

#[tokio::test]
async fn test_unparseable_reply_falls_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "I think they are the same."}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "{\"match\": false, \"confidence\": 0.9, \"reason\": \"different years\"}"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = ExternalVerifier::new(&config(&server)).unwrap();
    let (left, right) = pair();
    let verdict = verifier.verify(&left, &right).await;

    assert_eq!(verdict.confidence, 0.0);
    assert_eq!(verdict.reason, "different years");
    assert!(!verifier.state().last_call_failed);
}

#[tokio::test]
async fn test_bearer_token_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "{\"match\": true, \"confidence\": 1.0}"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let verifier =
        ExternalVerifier::new(&config(&server).with_api_token("secret-token")).unwrap();
    let (left, right) = pair();
    let verdict = verifier.verify(&left, &right).await;

    assert_eq!(verdict.confidence, 1.0);
    assert_eq!(verdict.reason, "no reason provided");
}
