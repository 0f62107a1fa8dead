//! Inference provider trait definition

use crate::{InferenceRequest, InferenceResponse, Result};
use async_trait::async_trait;

/// Trait for LLM inference providers
///
/// Implementations wrap a concrete inference service. The core performs no
/// retries of its own: a failing invocation is the caller's signal to
/// exclude the sample or substitute a fallback, so providers should fail
/// fast rather than mask errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Run a single inference request to completion
    async fn invoke(&self, request: InferenceRequest) -> Result<InferenceResponse>;

    /// Get the provider name (e.g., "openai-compat")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider() {
        let mut mock = MockInferenceProvider::new();
        mock.expect_invoke().returning(|_| {
            Ok(InferenceResponse {
                content: "Strong team. Score: 82".to_string(),
            })
        });
        mock.expect_name().return_const("mock".to_string());

        let response = mock
            .invoke(InferenceRequest::new("Analyze the founder profile."))
            .await
            .unwrap();
        assert!(response.content.ends_with("Score: 82"));
        assert_eq!(mock.name(), "mock");
    }
}
