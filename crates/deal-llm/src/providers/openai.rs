//! OpenAI-compatible provider implementation
//!
//! This module implements the InferenceProvider trait against the OpenAI
//! chat/completions wire shape. Hosted services (OpenAI, Groq, Azure) and
//! local deployments (vLLM, llama.cpp, LM Studio) all speak it, so a custom
//! base URL is the only thing that changes between them.
//!
//! # Examples
//!
//! ```no_run
//! use deal_llm::providers::{OpenAICompatConfig, OpenAICompatProvider};
//! use deal_llm::{InferenceProvider, InferenceRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OpenAICompatConfig::new("sk-...", "llama-3.1-8b-instant")
//!         .with_api_base("https://api.groq.com/openai/v1")
//!         .with_timeout(30);
//!
//!     let provider = OpenAICompatProvider::with_config(config)?;
//!     let response = provider
//!         .invoke(InferenceRequest::new("Say hello."))
//!         .await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use crate::{InferenceProvider, InferenceRequest, InferenceResponse, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAICompatConfig {
    /// Create a new config with the given API key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `LLM_API_KEY`. Optionally reads the base URL
    /// from `LLM_API_BASE` and the model name from `LLM_MODEL_NAME`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY").map_err(|_| {
            crate::LLMError::ConfigurationError(
                "LLM_API_KEY environment variable not set".to_string(),
            )
        })?;

        let api_base =
            std::env::var("LLM_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = std::env::var("LLM_MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            api_base,
            model,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI-compatible inference provider
pub struct OpenAICompatProvider {
    client: Client,
    config: OpenAICompatConfig,
}

impl OpenAICompatProvider {
    /// Create a new provider with custom configuration
    pub fn with_config(config: OpenAICompatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAICompatConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAICompatConfig {
        &self.config
    }
}

#[async_trait]
impl InferenceProvider for OpenAICompatProvider {
    #[instrument(skip(self, request), fields(model = %self.config.model, api_base = %self.config.api_base))]
    async fn invoke(&self, request: InferenceRequest) -> Result<InferenceResponse> {
        debug!("Sending request to {}", self.config.api_base);

        let wire_request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => crate::LLMError::AuthenticationFailed,
                429 => crate::LLMError::RateLimitExceeded(error_text),
                400 => crate::LLMError::InvalidRequest(error_text),
                _ => crate::LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let wire_response: ChatResponse = response.json().await.map_err(|e| {
            crate::LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let choice = wire_response.choices.into_iter().next().ok_or_else(|| {
            crate::LLMError::UnexpectedResponse("No choices in response".to_string())
        })?;

        debug!("Received response - finish_reason: {}", choice.finish_reason);

        Ok(InferenceResponse {
            content: choice.message.content,
        })
    }

    fn name(&self) -> &str {
        "openai-compat"
    }
}

// Wire types for the chat/completions endpoint

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: String,
}
