//! Claude - Anthropic Messages API client
//!
//! This module implements the completion client against the Anthropic
//! Messages API using reqwest. One request per call, no retries; failures
//! surface as [`Error::Transport`] or [`Error::Upstream`].

use crate::error::{Error, Result};
use crate::message::{ChatMessage, CompletionParams, DEFAULT_MODEL};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Anthropic API version header value
const API_VERSION: &str = "2023-06-01";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Mask an API key for log/debug output, keeping only short affixes
fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "***".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

// ============================================================================
// Client Trait
// ============================================================================

/// A text-completion capability.
///
/// Tools depend on this trait rather than the concrete client so tests can
/// substitute a scripted stub.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion call and return the generated text
    async fn complete(&self, params: CompletionParams) -> Result<String>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

impl From<&ChatMessage> for ApiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Join the text blocks of a response body, newline-separated.
///
/// A response with no text blocks falls back to the raw body so callers
/// always get something printable.
fn render_response(body: &str) -> Result<String> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    let texts: Vec<&str> = parsed
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect();

    if texts.is_empty() {
        return Ok(body.to_string());
    }

    Ok(texts.join("\n"))
}

// ============================================================================
// Configuration
// ============================================================================

/// Claude client configuration
#[derive(Clone)]
pub struct ClaudeConfig {
    /// API key
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Default model
    pub default_model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClaudeConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let default_model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            default_model,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Client
// ============================================================================

/// Claude Messages API client
pub struct ClaudeClient {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeClient {
    /// Create a new client
    pub fn new(config: ClaudeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClaudeConfig::from_env()?)
    }

    /// The configured default model
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[async_trait::async_trait]
impl CompletionClient for ClaudeClient {
    #[instrument(skip(self, params), fields(model = %params.model, max_tokens = params.max_tokens))]
    async fn complete(&self, params: CompletionParams) -> Result<String> {
        let request = ApiRequest {
            model: params.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: params.messages.iter().map(ApiMessage::from).collect(),
            system: params.system,
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        debug!(url = %url, messages = request.messages.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        render_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ClaudeConfig::new("test-key")
            .with_base_url("http://localhost:9999")
            .with_model("claude-3-7-sonnet-20250219")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.default_model, "claude-3-7-sonnet-20250219");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_debug_masks_key() {
        let config = ClaudeConfig::new("sk-ant-REDACTED");
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("1234567890"));
        assert!(debug_str.contains("sk-a...ghij"));
    }

    #[test]
    fn test_mask_short_key() {
        assert_eq!(mask_api_key("short"), "***");
    }

    #[test]
    fn test_render_response_joins_text_blocks() {
        let body = r#"{
            "id": "msg_01",
            "content": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ],
            "model": "claude-3-5-sonnet-20241022",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        assert_eq!(render_response(body).unwrap(), "first\nsecond");
    }

    #[test]
    fn test_render_response_skips_non_text_blocks() {
        let body = r#"{"content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "answer"}
        ]}"#;

        assert_eq!(render_response(body).unwrap(), "answer");
    }

    #[test]
    fn test_render_response_falls_back_to_raw_body() {
        let body = r#"{"content": []}"#;
        assert_eq!(render_response(body).unwrap(), body);
    }

    #[test]
    fn test_render_response_rejects_garbage() {
        assert!(matches!(
            render_response("not json"),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_stub_client_through_trait() {
        struct Echo;

        #[async_trait::async_trait]
        impl CompletionClient for Echo {
            async fn complete(&self, params: CompletionParams) -> Result<String> {
                Ok(params.messages[0].content.clone())
            }
        }

        let client: Box<dyn CompletionClient> = Box::new(Echo);
        let text =
            tokio_test::block_on(client.complete(CompletionParams::prompt("echo me"))).unwrap();
        assert_eq!(text, "echo me");
    }
}
