//! Judge endpoint shapes.
//!
//! The same judge host is tried through up to four compatible APIs. Each
//! endpoint knows its path, how to build its request body and where the
//! answer text lives in its response.

use serde::{Deserialize, Serialize};

/// One API shape the judge can be reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeEndpoint {
    /// Ollama `/api/chat` with JSON format enforcement.
    OllamaChat,
    /// Ollama `/api/generate`, single prompt.
    OllamaGenerate,
    /// OpenAI-compatible `/v1/chat/completions`.
    OpenAiChat,
    /// OpenAI-compatible `/v1/completions`.
    OpenAiCompletion,
}

impl JudgeEndpoint {
    /// Endpoints in the order they are tried.
    pub fn default_chain() -> Vec<JudgeEndpoint> {
        vec![
            Self::OllamaChat,
            Self::OllamaGenerate,
            Self::OpenAiChat,
            Self::OpenAiCompletion,
        ]
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::OllamaChat => "/api/chat",
            Self::OllamaGenerate => "/api/generate",
            Self::OpenAiChat => "/v1/chat/completions",
            Self::OpenAiCompletion => "/v1/completions",
        }
    }

    /// Join the endpoint path onto `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Build the JSON request body.
    pub fn payload(&self, params: &RequestParams<'_>, system: &str, user: &str) -> serde_json::Value {
        let messages = || {
            vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ]
        };
        let prompt = || format!("{}\n\n{}", system, user);
        let options = OllamaOptions {
            temperature: params.temperature,
            num_predict: params.max_tokens,
        };

        let body = match self {
            Self::OllamaChat => serde_json::to_value(OllamaChatRequest {
                model: params.model,
                messages: messages(),
                format: "json",
                stream: false,
                options,
            }),
            Self::OllamaGenerate => serde_json::to_value(OllamaGenerateRequest {
                model: params.model,
                prompt: prompt(),
                format: "json",
                stream: false,
                options,
            }),
            Self::OpenAiChat => serde_json::to_value(OpenAiChatRequest {
                model: params.model,
                messages: messages(),
                stream: false,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            }),
            Self::OpenAiCompletion => serde_json::to_value(OpenAiCompletionRequest {
                model: params.model,
                prompt: prompt(),
                stream: false,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            }),
        };
        // Plain structs of strings and numbers always serialize
        body.unwrap_or_default()
    }

    /// Pull the answer text out of a response body. Returns `None` when the
    /// body does not have this endpoint's shape.
    pub fn extract_text(&self, body: &str) -> Option<String> {
        match self {
            Self::OllamaChat => {
                let resp: OllamaChatResponse = serde_json::from_str(body).ok()?;
                resp.message.map(|m| m.content).or(resp.response)
            }
            Self::OllamaGenerate => {
                let resp: OllamaGenerateResponse = serde_json::from_str(body).ok()?;
                Some(resp.response)
            }
            Self::OpenAiChat => {
                let resp: OpenAiResponse = serde_json::from_str(body).ok()?;
                resp.choices.into_iter().next()?.message.map(|m| m.content)
            }
            Self::OpenAiCompletion => {
                let resp: OpenAiResponse = serde_json::from_str(body).ok()?;
                resp.choices.into_iter().next()?.text
            }
        }
    }
}

impl std::fmt::Display for JudgeEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Sampling settings shared by every endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    format: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    format: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiCompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<ChatMessage>,
    response: Option<String>,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: Option<ChatMessage>,
    text: Option<String>,
}
