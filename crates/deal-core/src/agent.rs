//! Core CategoryAgent trait definition

use crate::{AgentResult, AnalysisContext, Result};
use async_trait::async_trait;

/// Trait implemented by each of the five category analyzers
///
/// An agent turns the pitch document text (plus read-only context from
/// previously completed agents) into exactly one [`AgentResult`]. Agents are
/// stateless between invocations; everything an invocation produces travels
/// in the result.
#[async_trait]
pub trait CategoryAgent: Send + Sync {
    /// The category this agent scores
    fn category(&self) -> crate::Category;

    /// Analyze the document and produce a scored result
    ///
    /// Implementations degrade internally where they can (missing metrics,
    /// unparseable LLM output); an `Err` here means no usable result could
    /// be produced and the caller decides whether to substitute a fallback.
    async fn analyze(&self, document_text: &str, context: &AnalysisContext)
        -> Result<AgentResult>;
}
