//! Inference request and response types

use serde::{Deserialize, Serialize};

/// A single prompt-in, text-out inference request
///
/// Sampling temperature travels per request (ensemble members of one
/// category run the same prompt at different temperatures); the model name
/// belongs to the provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// The full prompt text
    pub prompt: String,

    /// Sampling temperature (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

/// Response from an inference request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    /// Generated text
    pub content: String,
}

impl InferenceRequest {
    /// Create a builder for inference requests
    pub fn builder(prompt: impl Into<String>) -> InferenceRequestBuilder {
        InferenceRequestBuilder::new(prompt)
    }

    /// Shorthand for a request with default sampling settings
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::builder(prompt).build()
    }
}

/// Builder for InferenceRequest
pub struct InferenceRequestBuilder {
    prompt: String,
    temperature: Option<f32>,
    max_tokens: usize,
}

impl InferenceRequestBuilder {
    /// Create a new builder
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: 1024,
        }
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the inference request
    pub fn build(self) -> InferenceRequest {
        InferenceRequest {
            prompt: self.prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
