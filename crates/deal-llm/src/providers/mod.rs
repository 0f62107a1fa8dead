//! Concrete inference provider implementations
//!
//! This module contains implementations of the InferenceProvider trait for
//! OpenAI-compatible inference services.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAICompatConfig, OpenAICompatProvider};
