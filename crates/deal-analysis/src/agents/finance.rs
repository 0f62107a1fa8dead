//! Financial analysis agent

use crate::agents::{
    agreement_confidence, blend, calculation_details, extras_value, keyword_hits,
    pattern_excerpts, reference_normalized, weighted_mean,
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
    ("burn_rate", r"burn.*?[\$]?(\d+(?:\.\d+)?)\s*(?:million|thousand|M|K)?"),
    ("runway", r"runway.*?(\d+(?:\.\d+)?)\s*(?:months?|years?)"),
    ("cac", r"CAC.*?[\$]?(\d+(?:\.\d+)?)"),
    ("ltv", r"LTV.*?[\$]?(\d+(?:\.\d+)?)"),
    ("gross_margin", r"(?:gross\s*)?margin.*?(\d+(?:\.\d+)?)%"),
    ("funding_raised", r"raised.*?[\$]?(\d+(?:\.\d+)?)\s*(?:million|thousand|M|K)?"),
];

const WEIGHT_FACTORS: [(&str, f64); 4] = [
    ("unit_economics", 0.3),
    ("burn_runway", 0.25),
    ("funding_efficiency", 0.25),
    ("financial_projections", 0.2),
];

const PROJECTION_POSITIVE: &[&str] =
    &["conservative", "realistic", "based on", "historical", "validated"];
const PROJECTION_NEGATIVE: &[&str] = &["aggressive", "optimistic", "hockey stick", "exponential"];

const EVIDENCE_PATTERNS: &[&str] = &[
    r"(\$\d+(?:\.\d+)?\s*(?:million|thousand|M|K)?\s*(?:burn|runway|CAC|LTV))",
    r"(LTV\s*/\s*CAC.*?\d+(?:\.\d+)?)",
    r"(\d+(?:\.\d+)?%\s*(?:margin|growth))",
];

/// Scores unit economics, runway, capital efficiency, and projection
/// credibility
pub struct FinanceAgent {
    judge: EnsembleJudge,
    extractor: MetricExtractor,
    evidence_patterns: Vec<Regex>,
    normalizer: NormalizationEngine,
    config: Arc<AnalysisConfig>,
}

impl FinanceAgent {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: Arc<AnalysisConfig>) -> Result<Self> {
        Ok(Self {
            judge: EnsembleJudge::new(provider, &config)?,
            extractor: MetricExtractor::new(Category::Finance, METRIC_RULES)?,
            evidence_patterns: EVIDENCE_PATTERNS
                .iter()
                .map(|p| Ok(RegexBuilder::new(p).case_insensitive(true).build()?))
                .collect::<Result<Vec<_>>>()?,
            normalizer: NormalizationEngine::new(config.normalization_method),
            config,
        })
    }

    /// LTV/CAC ratio banding plus gross-margin bonus over a neutral base
    fn unit_economics_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let cac = metrics.get("cac").copied().unwrap_or_default();
        let ltv = metrics.get("ltv").copied().unwrap_or_default();
        let margin = metrics.get("gross_margin").copied().unwrap_or_default();

        let mut score: f64 = 50.0;

        if cac > 0.0 && ltv > 0.0 {
            let ratio = ltv / cac;
            score += if ratio >= 5.0 {
                25.0
            } else if ratio >= 3.0 {
                20.0
            } else if ratio >= 2.0 {
                10.0
            } else {
                -10.0
            };
        }

        if margin >= 80.0 {
            score += 15.0;
        } else if margin >= 60.0 {
            score += 10.0;
        } else if margin >= 40.0 {
            score += 5.0;
        }

        score.clamp(20.0, 100.0)
    }

    /// Runway banding (months)
    fn burn_runway_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let runway = metrics.get("runway").copied().unwrap_or_default();

        if runway >= 24.0 {
            90.0
        } else if runway >= 18.0 {
            80.0
        } else if runway >= 12.0 {
            70.0
        } else if runway >= 6.0 {
            50.0
        } else {
            30.0
        }
    }

    /// Months of burn the raised capital covers
    fn funding_efficiency_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let funding = metrics.get("funding_raised").copied().unwrap_or_default();
        let burn = metrics.get("burn_rate").copied().unwrap_or_default();

        if funding > 0.0 && burn > 0.0 {
            let ratio = funding / burn;
            if ratio >= 30.0 {
                85.0
            } else if ratio >= 20.0 {
                75.0
            } else if ratio >= 12.0 {
                65.0
            } else {
                45.0
            }
        } else {
            60.0
        }
    }

    /// Projection credibility from language: conservative phrasing earns,
    /// hockey-stick phrasing costs
    fn projection_score(text_lower: &str) -> f64 {
        let positive = keyword_hits(text_lower, PROJECTION_POSITIVE) as f64 * 10.0;
        let negative = keyword_hits(text_lower, PROJECTION_NEGATIVE) as f64 * 5.0;
        (60.0 + positive - negative).clamp(30.0, 90.0)
    }
}

#[async_trait]
impl CategoryAgent for FinanceAgent {
    fn category(&self) -> Category {
        Category::Finance
    }

    async fn analyze(
        &self,
        document_text: &str,
        _context: &AnalysisContext,
    ) -> deal_core::Result<AgentResult> {
        let start = Instant::now();

        let raw_metrics = self.extractor.extract_map(document_text);
        let prompt = prompts::analysis_prompt(
            Category::Finance,
            prompts::excerpt(document_text, self.config.max_prompt_chars),
        );
        let consensus = self.judge.judge(Category::Finance, &prompt).await;

        let text_lower = document_text.to_lowercase();
        let component_scores: BTreeMap<String, f64> = [
            (
                "unit_economics".to_string(),
                Self::unit_economics_score(&raw_metrics),
            ),
            (
                "burn_runway".to_string(),
                Self::burn_runway_score(&raw_metrics),
            ),
            (
                "funding_efficiency".to_string(),
                Self::funding_efficiency_score(&raw_metrics),
            ),
            (
                "financial_projections".to_string(),
                Self::projection_score(&text_lower),
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
            calculated, final_score, "finance analysis scored"
        );

        let evidence = pattern_excerpts(
            document_text,
            &self.evidence_patterns,
            EvidenceKind::FinancialMetric,
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
                Category::Finance,
                &raw_metrics,
            )),
        );
        details.extras.insert(
            "unit_economics".to_string(),
            extras_value(&finance_math::unit_economics(&raw_metrics)),
        );
        details.extras.insert(
            "burn_runway".to_string(),
            extras_value(&finance_math::burn_runway(&raw_metrics)),
        );

        Ok(AgentResult::new(Category::Finance, final_score, confidence)
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
    fn test_unit_economics_ratio_banding() {
        assert_eq!(
            FinanceAgent::unit_economics_score(&metrics(&[("ltv", 5000.0), ("cac", 1000.0)])),
            75.0
        );
        assert_eq!(
            FinanceAgent::unit_economics_score(&metrics(&[("ltv", 3000.0), ("cac", 1000.0)])),
            70.0
        );
        // Underwater ratio costs points
        assert_eq!(
            FinanceAgent::unit_economics_score(&metrics(&[("ltv", 900.0), ("cac", 1000.0)])),
            40.0
        );
        // No data stays at the neutral base
        assert_eq!(FinanceAgent::unit_economics_score(&BTreeMap::new()), 50.0);
    }

    #[test]
    fn test_margin_bonus_stacks_on_ratio() {
        let m = metrics(&[("ltv", 5000.0), ("cac", 1000.0), ("gross_margin", 85.0)]);
        assert_eq!(FinanceAgent::unit_economics_score(&m), 90.0);
    }

    #[test]
    fn test_runway_banding() {
        assert_eq!(FinanceAgent::burn_runway_score(&metrics(&[("runway", 30.0)])), 90.0);
        assert_eq!(FinanceAgent::burn_runway_score(&metrics(&[("runway", 18.0)])), 80.0);
        assert_eq!(FinanceAgent::burn_runway_score(&metrics(&[("runway", 12.0)])), 70.0);
        assert_eq!(FinanceAgent::burn_runway_score(&metrics(&[("runway", 7.0)])), 50.0);
        assert_eq!(FinanceAgent::burn_runway_score(&BTreeMap::new()), 30.0);
    }

    #[test]
    fn test_funding_efficiency() {
        let m = metrics(&[("funding_raised", 6.0), ("burn_rate", 0.2)]);
        assert_eq!(FinanceAgent::funding_efficiency_score(&m), 85.0);
        let m = metrics(&[("funding_raised", 3.0), ("burn_rate", 0.25)]);
        assert_eq!(FinanceAgent::funding_efficiency_score(&m), 65.0);
        // Insufficient data defaults to neutral
        assert_eq!(FinanceAgent::funding_efficiency_score(&BTreeMap::new()), 60.0);
    }

    #[test]
    fn test_projection_language_scoring() {
        assert_eq!(FinanceAgent::projection_score("plain projections"), 60.0);
        assert_eq!(
            FinanceAgent::projection_score("conservative estimates based on historical data"),
            90.0
        );
        assert_eq!(
            FinanceAgent::projection_score(
                "aggressive hockey stick with exponential optimistic curves"
            ),
            40.0
        );
    }
}
