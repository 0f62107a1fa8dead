//! Cross-agent analysis context
//!
//! `AnalysisContext` is the read-only view an agent gets of the run so far:
//! results of previously completed categories (the Risk agent consumes the
//! Finance score this way) plus caller-supplied hints such as the startup's
//! sector. Agents never mutate the context they receive; the orchestrator
//! owns the single mutable copy between waves.

use crate::{AgentResult, Category};
use std::collections::BTreeMap;

/// Read-only context passed to category agents
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    results: BTreeMap<Category, AgentResult>,
    sector: Option<String>,
}

impl AnalysisContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the startup's sector hint (used for domain-relevance scoring)
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// The startup's sector, if the caller supplied one
    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    /// Record a completed result (orchestrator use)
    pub fn insert(&mut self, result: AgentResult) {
        self.results.insert(result.category, result);
    }

    /// Result of a previously completed category
    pub fn get(&self, category: Category) -> Option<&AgentResult> {
        self.results.get(&category)
    }

    /// Score of a previously completed category
    pub fn score(&self, category: Category) -> Option<f64> {
        self.results.get(&category).map(|r| r.score)
    }

    /// Completed (category, result) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &AgentResult)> {
        self.results.iter().map(|(category, result)| (*category, result))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
