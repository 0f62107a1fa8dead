//! LLM inference abstraction for deal-rs
//!
//! The core consumes a single narrow contract: a prompt goes in, free text
//! comes out, and the call may fail or time out. Everything else (scoring
//! conventions, ensembles, fallbacks) lives in `deal-analysis`.
//!
//! The bundled [`providers::OpenAICompatProvider`] speaks the OpenAI
//! chat/completions wire shape, which covers OpenAI itself plus the
//! compatible inference services (Groq, vLLM, Azure, LM Studio) behind a
//! configurable base URL. Enable it with the `openai` feature.

pub mod error;
pub mod inference;
pub mod provider;
pub mod providers;

pub use error::{LLMError, Result};
pub use inference::{InferenceRequest, InferenceRequestBuilder, InferenceResponse};
pub use provider::InferenceProvider;
