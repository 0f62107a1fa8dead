//! Category agents
//!
//! One agent per investment dimension, each blending a single LLM judgment
//! (or ensemble consensus) with deterministic sub-scores computed from
//! extracted metrics and keyword signals. The shape is identical across
//! agents; the banding tables and patterns are what differ.

mod finance;
mod founder;
mod market;
mod risk;
mod traction;

pub use finance::FinanceAgent;
pub use founder::FounderAgent;
pub use market::MarketAgent;
pub use risk::RiskAgent;
pub use traction::TractionAgent;

use crate::scoring::NormalizationEngine;
use deal_core::{CalculationDetails, Category, Evidence, EvidenceKind};
use regex::Regex;
use std::collections::BTreeMap;

/// Distinct keywords from the list present in the text
///
/// Presence-based, not occurrence-based: a keyword repeated ten times
/// counts once.
pub(crate) fn keyword_hits(text_lower: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|keyword| text_lower.contains(*keyword))
        .count()
}

/// Weighted mean of named component scores
pub(crate) fn weighted_mean(
    components: &BTreeMap<String, f64>,
    weights: &[(&str, f64)],
) -> f64 {
    weights
        .iter()
        .map(|(name, weight)| components.get(*name).copied().unwrap_or_default() * weight)
        .sum()
}

/// Blend the LLM judgment with the deterministic score
pub(crate) fn blend(llm_score: f64, calculated_score: f64, llm_weight: f64) -> f64 {
    (llm_score * llm_weight + calculated_score * (1.0 - llm_weight)).clamp(0.0, 100.0)
}

/// Agreement-based confidence from sub-score spread
///
/// Tight agreement among sub-scores signals a well-evidenced category;
/// spread at or beyond `sigma_scale` floors out at 0.1.
pub(crate) fn agreement_confidence(component_scores: &[f64], sigma_scale: f64) -> f64 {
    let stdev = deal_utils::stats::sample_stdev(component_scores);
    (1.0 - stdev / sigma_scale).max(0.1)
}

/// Up to `limit` matched excerpts per pattern, tagged with one kind
pub(crate) fn pattern_excerpts(
    text: &str,
    patterns: &[Regex],
    kind: EvidenceKind,
    confidence: f64,
    limit: usize,
) -> Vec<Evidence> {
    let mut evidence = Vec::new();
    for pattern in patterns {
        for captures in pattern.captures_iter(text).take(limit) {
            if let Some(matched) = captures.get(1).or_else(|| captures.get(0)) {
                evidence.push(Evidence::excerpt(kind, matched.as_str().trim(), confidence));
            }
        }
    }
    evidence
}

/// Raw metrics rescaled onto 0-100 against their reference distributions
///
/// Recorded alongside the banded sub-scores so a reader can compare the
/// metric's standing to the banding verdict.
pub(crate) fn reference_normalized(
    engine: &NormalizationEngine,
    category: Category,
    metrics: &BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    metrics
        .iter()
        .map(|(name, value)| (name.clone(), engine.normalize(category, name, *value)))
        .collect()
}

/// Serialize an extras artifact, degrading to null rather than failing
pub(crate) fn extras_value<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Assemble the standard calculation breakdown
pub(crate) fn calculation_details(
    weights: &[(&str, f64)],
    component_scores: &BTreeMap<String, f64>,
    llm_score: f64,
    calculated_score: f64,
    final_score: f64,
) -> CalculationDetails {
    CalculationDetails {
        weight_factors: weights
            .iter()
            .map(|(name, weight)| ((*name).to_string(), *weight))
            .collect(),
        component_scores: component_scores.clone(),
        llm_score,
        calculated_score,
        final_score,
        extras: BTreeMap::new(),
    }
}
