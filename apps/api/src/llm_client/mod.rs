/// LLM Client — the single point of entry for all OpenAI calls in the brand voice service.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Generation code depends on the `CompletionProvider` trait; `LlmClient` is the
/// production implementation and tests substitute a scripted provider.
///
/// Model identifiers and token budgets live with each generation path, not here.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod normalize;
pub mod prompts;
pub mod retry;
pub mod stream;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CREDENTIALS_MESSAGE: &str =
    "There's an issue with the OpenAI API key. Please contact the site administrator.";
const RATE_LIMIT_MESSAGE: &str =
    "The AI service is currently experiencing high demand. Please try again in a few minutes.";
const NETWORK_MESSAGE: &str =
    "Network issue detected. Please check your internet connection and try again.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("API key rejected (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Rate limited (status 429): {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// The user-facing classes of invoker failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    Credentials,
    RateLimited,
    Network,
    Other,
}

impl LlmError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::MissingApiKey | LlmError::Unauthorized { .. } => LlmErrorKind::Credentials,
            LlmError::RateLimited(_) => LlmErrorKind::RateLimited,
            LlmError::Network(_) => LlmErrorKind::Network,
            LlmError::Api { .. } | LlmError::EmptyContent | LlmError::Decode(_) => {
                LlmErrorKind::Other
            }
        }
    }

    /// Rate limits, network failures and provider 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimited(_) | LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Message safe to show to the end user.
    /// Credentials, rate limits and network failures get fixed wording; anything else
    /// carries the provider's own message.
    pub fn user_message(&self) -> String {
        match self.kind() {
            LlmErrorKind::Credentials => CREDENTIALS_MESSAGE.to_string(),
            LlmErrorKind::RateLimited => RATE_LIMIT_MESSAGE.to_string(),
            LlmErrorKind::Network => NETWORK_MESSAGE.to_string(),
            LlmErrorKind::Other => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::Decode(e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}

/// One text-completion call: model, prompt, output budget, sampling temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: &'static str,
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: &'static str, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model,
            system: None,
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Incremental text deltas from a streamed completion.
pub type TextStream = BoxStream<'static, Result<String, LlmError>>;

/// The completion provider trait. Implement this to swap backends without touching
/// the generation pipelines or handlers.
///
/// Carried in `AppState` as `Arc<dyn CompletionProvider>`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issues a single completion request and returns the raw completion text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Streams the completion as text deltas. Providers without native streaming
    /// yield the whole completion as one delta.
    async fn stream(&self, request: &CompletionRequest) -> Result<TextStream, LlmError> {
        let text = self.complete(request).await?;
        Ok(futures::stream::once(async move { Ok(text) }).boxed())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

impl<'a> ChatRequest<'a> {
    fn from_request(request: &'a CompletionRequest, stream: bool) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        Self {
            model: request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmClient
// ────────────────────────────────────────────────────────────────────────────

/// OpenAI chat-completions client. Single attempt per call; callers that want
/// retries wrap the call in `retry::retry_with_backoff`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&ChatRequest::from_request(request, stream))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<OpenAiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        Err(classify_status(status.as_u16(), message))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let response: ChatResponse = self.send(request, false).await?.json().await?;

        if let Some(usage) = &response.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<TextStream, LlmError> {
        let response = self.send(request, true).await?;
        Ok(stream::decode_stream(response.bytes_stream()))
    }
}

fn classify_status(status: u16, message: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Unauthorized { status, message },
        429 => LlmError::RateLimited(message),
        _ => LlmError::Api { status, message },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_maps_auth_and_rate_limits() {
        assert_eq!(
            classify_status(401, "bad key".into()).kind(),
            LlmErrorKind::Credentials
        );
        assert_eq!(
            classify_status(429, "slow down".into()).kind(),
            LlmErrorKind::RateLimited
        );
        assert_eq!(
            classify_status(500, "boom".into()).kind(),
            LlmErrorKind::Other
        );
    }

    #[test]
    fn test_user_messages_are_distinct_per_class() {
        let credentials = LlmError::MissingApiKey.user_message();
        let rate = LlmError::RateLimited("429".into()).user_message();
        let network = LlmError::Network("connection reset".into()).user_message();

        assert!(credentials.contains("API key"));
        assert!(rate.contains("high demand"));
        assert!(network.contains("Network issue"));
    }

    #[test]
    fn test_other_errors_keep_provider_message() {
        let err = LlmError::Api {
            status: 400,
            message: "context length exceeded".into(),
        };
        assert!(err.user_message().contains("context length exceeded"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::RateLimited(String::new()).is_transient());
        assert!(LlmError::Network(String::new()).is_transient());
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::MissingApiKey.is_transient());
        assert!(!LlmError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = CompletionRequest::new("gpt-4o", "Hello", 1500)
            .with_system("Be brief")
            .with_temperature(0.7);
        let body = serde_json::to_value(ChatRequest::from_request(&request, false)).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_chat_request_stream_flag() {
        let request = CompletionRequest::new("gpt-4o-mini", "Hi", 100);
        let body = serde_json::to_value(ChatRequest::from_request(&request, true)).unwrap();

        assert_eq!(body["stream"], true);
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = LlmClient::new(
            None,
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client
            .complete(&CompletionRequest::new("gpt-4o", "Hello", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
