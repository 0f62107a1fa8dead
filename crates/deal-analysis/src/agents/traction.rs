//! Traction analysis agent

use crate::agents::{
    agreement_confidence, blend, calculation_details, extras_value, pattern_excerpts,
    reference_normalized, weighted_mean,
};
use crate::config::AnalysisConfig;
use crate::consensus::EnsembleJudge;
use crate::error::Result;
use crate::extractor::MetricExtractor;
use crate::finance_math;
use crate::prompts;
use crate::scoring::NormalizationEngine;
use async_trait::async_trait;
use deal_core::{AgentResult, AnalysisContext, Category, CategoryAgent, EvidenceKind};
use deal_llm::InferenceProvider;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const METRIC_RULES: &[(&str, &str)] = &[
    ("arr", r"ARR.*?[\$]?(\d+(?:\.\d+)?)\s*(?:million|thousand|M|K)?"),
    ("mrr", r"MRR.*?[\$]?(\d+(?:\.\d+)?)\s*(?:million|thousand|M|K)?"),
    ("revenue", r"revenue.*?[\$]?(\d+(?:\.\d+)?)\s*(?:million|thousand|M|K)?"),
    ("growth_rate", r"(?:growth|growing).*?(\d+(?:\.\d+)?)%"),
    ("customers", r"(?:customers?|users?).*?(\d+(?:,\d+)*)"),
    ("retention", r"retention.*?(\d+(?:\.\d+)?)%"),
    ("churn", r"churn.*?(\d+(?:\.\d+)?)%"),
];

const WEIGHT_FACTORS: [(&str, f64); 4] = [
    ("revenue_metrics", 0.35),
    ("growth_rate", 0.25),
    ("customer_metrics", 0.25),
    ("retention_metrics", 0.15),
];

const EVIDENCE_PATTERNS: &[&str] = &[
    r"(\$\d+(?:\.\d+)?\s*(?:million|thousand|M|K)?\s*(?:ARR|MRR|revenue))",
    r"(growing.*?\d+(?:\.\d+)?%)",
    r"(\d+(?:,\d+)*\s*(?:customers?|users?))",
];

/// Scores revenue, growth, customer base, and retention
pub struct TractionAgent {
    judge: EnsembleJudge,
    extractor: MetricExtractor,
    evidence_patterns: Vec<Regex>,
    normalizer: NormalizationEngine,
    config: Arc<AnalysisConfig>,
}

impl TractionAgent {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: Arc<AnalysisConfig>) -> Result<Self> {
        Ok(Self {
            judge: EnsembleJudge::new(provider, &config)?,
            extractor: MetricExtractor::new(Category::Traction, METRIC_RULES)?,
            evidence_patterns: EVIDENCE_PATTERNS
                .iter()
                .map(|p| Ok(RegexBuilder::new(p).case_insensitive(true).build()?))
                .collect::<Result<Vec<_>>>()?,
            normalizer: NormalizationEngine::new(config.normalization_method),
            config,
        })
    }

    /// Revenue banding over the best available figure (millions)
    ///
    /// ARR, annualized MRR, and stated revenue compete; the largest wins.
    fn revenue_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let arr = metrics.get("arr").copied().unwrap_or_default();
        let mrr = metrics.get("mrr").copied().unwrap_or_default();
        let revenue = metrics.get("revenue").copied().unwrap_or_default();

        let best = arr.max(mrr * 12.0).max(revenue);

        if best >= 10.0 {
            95.0
        } else if best >= 1.0 {
            85.0
        } else if best >= 0.1 {
            70.0
        } else if best >= 0.01 {
            50.0
        } else {
            30.0
        }
    }

    /// Growth-rate banding (percent, year over year)
    fn growth_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let growth = metrics.get("growth_rate").copied().unwrap_or_default();

        if growth >= 300.0 {
            95.0
        } else if growth >= 100.0 {
            85.0
        } else if growth >= 50.0 {
            70.0
        } else if growth >= 20.0 {
            55.0
        } else {
            40.0
        }
    }

    /// Customer-count banding
    fn customer_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let customers = metrics.get("customers").copied().unwrap_or_default();

        if customers >= 10_000.0 {
            95.0
        } else if customers >= 1_000.0 {
            85.0
        } else if customers >= 100.0 {
            80.0
        } else if customers >= 10.0 {
            50.0
        } else {
            35.0
        }
    }

    /// Retention banding, preferring a stated retention rate over one
    /// inferred from churn
    fn retention_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let retention = metrics.get("retention").copied().unwrap_or_default();
        let churn = metrics.get("churn").copied().unwrap_or_default();

        if retention > 0.0 {
            if retention >= 95.0 {
                95.0
            } else if retention >= 90.0 {
                85.0
            } else if retention >= 80.0 {
                70.0
            } else {
                50.0
            }
        } else if churn > 0.0 {
            if churn <= 2.0 {
                95.0
            } else if churn <= 5.0 {
                80.0
            } else if churn <= 10.0 {
                65.0
            } else {
                40.0
            }
        } else {
            60.0
        }
    }
}

#[async_trait]
impl CategoryAgent for TractionAgent {
    fn category(&self) -> Category {
        Category::Traction
    }

    async fn analyze(
        &self,
        document_text: &str,
        _context: &AnalysisContext,
    ) -> deal_core::Result<AgentResult> {
        let start = Instant::now();

        let raw_metrics = self.extractor.extract_map(document_text);
        let prompt = prompts::analysis_prompt(
            Category::Traction,
            prompts::excerpt(document_text, self.config.max_prompt_chars),
        );
        let consensus = self.judge.judge(Category::Traction, &prompt).await;

        let component_scores: BTreeMap<String, f64> = [
            (
                "revenue_metrics".to_string(),
                Self::revenue_score(&raw_metrics),
            ),
            ("growth_rate".to_string(), Self::growth_score(&raw_metrics)),
            (
                "customer_metrics".to_string(),
                Self::customer_score(&raw_metrics),
            ),
            (
                "retention_metrics".to_string(),
                Self::retention_score(&raw_metrics),
            ),
        ]
        .into_iter()
        .collect();

        let calculated = weighted_mean(&component_scores, &WEIGHT_FACTORS);
        let final_score = blend(consensus.score, calculated, self.config.llm_blend_weight);
        let components: Vec<f64> = component_scores.values().copied().collect();
        let confidence = agreement_confidence(&components, self.config.subscore_sigma_scale);

        debug!(
            llm_score = consensus.score,
            calculated, final_score, "traction analysis scored"
        );

        let evidence = pattern_excerpts(
            document_text,
            &self.evidence_patterns,
            EvidenceKind::TractionMetric,
            0.8,
            3,
        );

        let mut details = calculation_details(
            &WEIGHT_FACTORS,
            &component_scores,
            consensus.score,
            calculated,
            final_score,
        );
        details
            .extras
            .insert("ensemble".to_string(), extras_value(&consensus));
        details.extras.insert(
            "reference_normalized".to_string(),
            extras_value(&reference_normalized(
                &self.normalizer,
                Category::Traction,
                &raw_metrics,
            )),
        );
        details.extras.insert(
            "unit_economics".to_string(),
            extras_value(&finance_math::unit_economics(&raw_metrics)),
        );

        Ok(AgentResult::new(Category::Traction, final_score, confidence)
            .with_summary(prompts::truncate_chars(&consensus.text, 500))
            .with_detailed_analysis(consensus.detail.clone())
            .with_evidence(evidence)
            .with_raw_metrics(raw_metrics)
            .with_normalized_metrics(component_scores)
            .with_calculation_details(details)
            .with_processing_time(start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_revenue_uses_best_available_figure() {
        // Annualized MRR beats the stated ARR here
        let score = TractionAgent::revenue_score(&metrics(&[("arr", 0.5), ("mrr", 0.2)]));
        assert_eq!(score, 85.0);
        assert_eq!(TractionAgent::revenue_score(&metrics(&[("revenue", 12.0)])), 95.0);
        assert_eq!(TractionAgent::revenue_score(&BTreeMap::new()), 30.0);
    }

    #[test]
    fn test_reference_scenario_bandings() {
        // ARR $2M, growth 150%, 500 customers, no retention data
        let m = metrics(&[("arr", 2.0), ("growth_rate", 150.0), ("customers", 500.0)]);
        assert_eq!(TractionAgent::revenue_score(&m), 85.0);
        assert_eq!(TractionAgent::growth_score(&m), 85.0);
        assert_eq!(TractionAgent::customer_score(&m), 80.0);
        assert_eq!(TractionAgent::retention_score(&m), 60.0);
    }

    #[test]
    fn test_growth_banding_edges() {
        assert_eq!(TractionAgent::growth_score(&metrics(&[("growth_rate", 300.0)])), 95.0);
        assert_eq!(TractionAgent::growth_score(&metrics(&[("growth_rate", 100.0)])), 85.0);
        assert_eq!(TractionAgent::growth_score(&metrics(&[("growth_rate", 50.0)])), 70.0);
        assert_eq!(TractionAgent::growth_score(&metrics(&[("growth_rate", 20.0)])), 55.0);
        assert_eq!(TractionAgent::growth_score(&metrics(&[("growth_rate", 5.0)])), 40.0);
    }

    #[test]
    fn test_retention_preferred_over_churn() {
        let both = metrics(&[("retention", 85.0), ("churn", 1.0)]);
        // Stated retention (70) wins over what churn would imply (95)
        assert_eq!(TractionAgent::retention_score(&both), 70.0);
    }

    #[test]
    fn test_churn_inference() {
        assert_eq!(TractionAgent::retention_score(&metrics(&[("churn", 1.5)])), 95.0);
        assert_eq!(TractionAgent::retention_score(&metrics(&[("churn", 4.0)])), 80.0);
        assert_eq!(TractionAgent::retention_score(&metrics(&[("churn", 8.0)])), 65.0);
        assert_eq!(TractionAgent::retention_score(&metrics(&[("churn", 20.0)])), 40.0);
    }
}
