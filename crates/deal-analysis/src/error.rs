//! Error types for pitch analysis operations

use std::time::Duration;
use thiserror::Error;

/// Pitch analysis specific errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// LLM invocation failed
    #[error("LLM error: {0}")]
    Llm(#[from] deal_llm::LLMError),

    /// LLM invocation exceeded its time budget
    #[error("Invocation timed out after {0:?}")]
    Timeout(Duration),

    /// A pattern rule failed to compile
    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Convert AnalysisError to deal_core::Error
impl From<AnalysisError> for deal_core::Error {
    fn from(err: AnalysisError) -> Self {
        deal_core::Error::AnalysisFailed(err.to_string())
    }
}

/// Convert deal_core::Error to AnalysisError
impl From<deal_core::Error> for AnalysisError {
    fn from(err: deal_core::Error) -> Self {
        AnalysisError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Invocation timed out after 30s");

        let err = AnalysisError::ConfigError("blend weight out of range".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: blend weight out of range"
        );
    }

    #[test]
    fn test_error_conversion() {
        let analysis_err = AnalysisError::Other("missing context".to_string());
        let core_err: deal_core::Error = analysis_err.into();

        match core_err {
            deal_core::Error::AnalysisFailed(msg) => {
                assert!(msg.contains("missing context"));
            }
            _ => panic!("Expected AnalysisFailed variant"),
        }
    }
}
