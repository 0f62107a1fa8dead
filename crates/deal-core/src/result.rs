//! Agent result model
//!
//! An [`AgentResult`] is produced by exactly one `CategoryAgent` invocation
//! and is immutable after creation. Downstream consumers (the orchestrator,
//! and the Risk agent via `AnalysisContext`) only ever read it.

use crate::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Where a piece of evidence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// Matched directly in the pitch document
    Document,
    /// Derived during analysis (LLM output or cross-agent context)
    Analysis,
}

/// What kind of signal a piece of evidence carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    FounderInfo,
    MarketMetric,
    MarketTrend,
    TractionMetric,
    FinancialMetric,
    RiskFactor,
}

/// A single excerpt or extracted value supporting an agent's score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    /// Matched excerpt or derived description
    pub text: String,
    /// Metric name, when the evidence is a named numeric value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Numeric value, when the evidence is a named numeric value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub confidence: f64,
    pub source: EvidenceSource,
}

impl Evidence {
    /// Evidence backed by a document excerpt
    pub fn excerpt(kind: EvidenceKind, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind,
            text: text.into(),
            metric: None,
            value: None,
            confidence: confidence.clamp(0.0, 1.0),
            source: EvidenceSource::Document,
        }
    }

    /// Evidence backed by an extracted named metric
    pub fn metric(
        kind: EvidenceKind,
        name: impl Into<String>,
        value: f64,
        confidence: f64,
    ) -> Self {
        let name = name.into();
        Self {
            kind,
            text: format!("{name} = {value}"),
            metric: Some(name),
            value: Some(value),
            confidence: confidence.clamp(0.0, 1.0),
            source: EvidenceSource::Document,
        }
    }

    /// Evidence produced during analysis rather than matched in the document
    pub fn derived(kind: EvidenceKind, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            kind,
            text: text.into(),
            metric: None,
            value: None,
            confidence: confidence.clamp(0.0, 1.0),
            source: EvidenceSource::Analysis,
        }
    }
}

/// How an agent's final score was assembled
///
/// `extras` carries per-category artifacts (unit economics, financial
/// ratios, ensemble details, risk mitigation assessment) without widening
/// the struct for every agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationDetails {
    /// Sub-score weight factors used by the heuristic blend
    pub weight_factors: BTreeMap<String, f64>,
    /// Deterministic sub-scores, keyed by component name
    pub component_scores: BTreeMap<String, f64>,
    /// Score parsed (or heuristically derived) from the LLM response
    pub llm_score: f64,
    /// Weighted mean of the deterministic sub-scores
    pub calculated_score: f64,
    /// Blended final score
    pub final_score: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, serde_json::Value>,
}

/// The complete output of one category agent invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub category: Category,
    /// Final category score, clamped to [0, 100]
    pub score: f64,
    /// Narrative text preceding the score marker in the LLM response
    pub summary: String,
    /// Full LLM response (or fallback narrative)
    pub detailed_analysis: String,
    pub evidence: Vec<Evidence>,
    /// Agreement-based confidence, clamped to [0, 1]
    pub confidence: f64,
    /// Metrics extracted from the document, as found
    pub raw_metrics: BTreeMap<String, f64>,
    /// Deterministic sub-scores on the 0-100 scale
    pub normalized_metrics: BTreeMap<String, f64>,
    pub calculation_details: CalculationDetails,
    pub processing_time: Duration,
    /// True when this result substitutes for a failed analysis
    #[serde(default)]
    pub fallback: bool,
}

impl AgentResult {
    /// Create a result with clamped score and confidence
    pub fn new(category: Category, score: f64, confidence: f64) -> Self {
        Self {
            category,
            score: score.clamp(0.0, 100.0),
            summary: String::new(),
            detailed_analysis: String::new(),
            evidence: Vec::new(),
            confidence: confidence.clamp(0.0, 1.0),
            raw_metrics: BTreeMap::new(),
            normalized_metrics: BTreeMap::new(),
            calculation_details: CalculationDetails::default(),
            processing_time: Duration::ZERO,
            fallback: false,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_detailed_analysis(mut self, text: impl Into<String>) -> Self {
        self.detailed_analysis = text.into();
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_raw_metrics(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.raw_metrics = metrics;
        self
    }

    pub fn with_normalized_metrics(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.normalized_metrics = metrics;
        self
    }

    pub fn with_calculation_details(mut self, details: CalculationDetails) -> Self {
        self.calculation_details = details;
        self
    }

    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = elapsed;
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_and_confidence_clamped() {
        let result = AgentResult::new(Category::Market, 140.0, 1.7);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.confidence, 1.0);

        let result = AgentResult::new(Category::Market, -5.0, -0.2);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_builder_chain() {
        let result = AgentResult::new(Category::Traction, 72.0, 0.8)
            .with_summary("solid revenue momentum")
            .with_evidence(vec![Evidence::metric(
                EvidenceKind::TractionMetric,
                "arr",
                2.0,
                0.8,
            )])
            .as_fallback();

        assert_eq!(result.summary, "solid revenue momentum");
        assert_eq!(result.evidence.len(), 1);
        assert!(result.fallback);
    }

    #[test]
    fn test_evidence_metric_fields() {
        let evidence = Evidence::metric(EvidenceKind::MarketMetric, "tam", 50.0, 0.8);
        assert_eq!(evidence.metric.as_deref(), Some("tam"));
        assert_eq!(evidence.value, Some(50.0));
        assert_eq!(evidence.source, EvidenceSource::Document);
    }

    #[test]
    fn test_serde_roundtrip() {
        let result = AgentResult::new(Category::Finance, 61.5, 0.55)
            .with_summary("margin profile is credible");
        let json = serde_json::to_string(&result).unwrap();
        let back: AgentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.category, Category::Finance);
        assert_eq!(back.score, 61.5);
        assert!(!back.fallback);
    }
}
