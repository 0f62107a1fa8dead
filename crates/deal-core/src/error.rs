//! Error types for deal-core

use thiserror::Error;

/// Result type alias for deal-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent analysis failed
    #[error("Agent analysis failed: {0}")]
    AnalysisFailed(String),

    /// Input document was unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
