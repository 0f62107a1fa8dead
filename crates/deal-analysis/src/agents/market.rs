//! Market opportunity analysis agent

use crate::agents::{
    agreement_confidence, blend, calculation_details, extras_value, keyword_hits,
    pattern_excerpts, reference_normalized, weighted_mean,
};
use crate::config::AnalysisConfig;
use crate::consensus::EnsembleJudge;
use crate::error::Result;
use crate::extractor::MetricExtractor;
use crate::prompts;
use crate::scoring::NormalizationEngine;
use async_trait::async_trait;
use deal_core::{AgentResult, AnalysisContext, Category, CategoryAgent, Evidence, EvidenceKind};
use deal_llm::InferenceProvider;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const METRIC_RULES: &[(&str, &str)] = &[
    ("tam", r"TAM.*?[\$]?(\d+(?:\.\d+)?)\s*(?:billion|million|B|M)"),
    ("sam", r"SAM.*?[\$]?(\d+(?:\.\d+)?)\s*(?:billion|million|B|M)"),
    ("som", r"SOM.*?[\$]?(\d+(?:\.\d+)?)\s*(?:billion|million|B|M)"),
    ("growth_rate", r"(?:growth|growing).*?(\d+(?:\.\d+)?)%"),
    ("market_share", r"market\s*share.*?(\d+(?:\.\d+)?)%"),
];

const WEIGHT_FACTORS: [(&str, f64); 4] = [
    ("market_size", 0.3),
    ("growth_rate", 0.25),
    ("competition_density", 0.2),
    ("market_timing", 0.25),
];

const GROWTH_KEYWORDS: &[&str] = &["expanding", "increasing", "rising", "booming", "emerging"];
const COMPETITION_KEYWORDS: &[&str] = &["competitor", "competitive", "crowded", "saturated"];
const TIMING_POSITIVE: &[&str] = &["opportunity", "ready", "emerging", "trend", "demand"];
const TIMING_NEGATIVE: &[&str] = &["declining", "mature", "saturated", "late"];

const EVIDENCE_PATTERNS: &[&str] = &[
    r"(market.*?growing.*?\d+%)",
    r"(\$\d+(?:\.\d+)?\s*billion.*?market)",
    r"(opportunity.*?\$\d+(?:\.\d+)?)",
];

/// Scores market size, growth, competition density, and timing
pub struct MarketAgent {
    judge: EnsembleJudge,
    extractor: MetricExtractor,
    evidence_patterns: Vec<Regex>,
    normalizer: NormalizationEngine,
    config: Arc<AnalysisConfig>,
}

impl MarketAgent {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: Arc<AnalysisConfig>) -> Result<Self> {
        Ok(Self {
            judge: EnsembleJudge::new(provider, &config)?,
            extractor: MetricExtractor::new(Category::Market, METRIC_RULES)?,
            evidence_patterns: EVIDENCE_PATTERNS
                .iter()
                .map(|p| Ok(RegexBuilder::new(p).case_insensitive(true).build()?))
                .collect::<Result<Vec<_>>>()?,
            normalizer: NormalizationEngine::new(config.normalization_method),
            config,
        })
    }

    /// TAM banding with a SAM/TAM sanity bonus
    ///
    /// The SAM bonus only applies when the ratio lands in the credible
    /// 1-30% window; a SAM that nearly equals TAM is a red flag, not a plus.
    fn market_size_score(metrics: &BTreeMap<String, f64>) -> f64 {
        let tam = metrics.get("tam").copied().unwrap_or_default();
        let sam = metrics.get("sam").copied().unwrap_or_default();

        let tam_score: f64 = if tam >= 100.0 {
            95.0
        } else if tam >= 10.0 {
            85.0
        } else if tam >= 1.0 {
            70.0
        } else if tam >= 0.1 {
            50.0
        } else {
            30.0
        };

        let sam_bonus = if sam > 0.0 && tam > 0.0 {
            let ratio = sam / tam;
            if (0.01..=0.3).contains(&ratio) { 10.0 } else { 0.0 }
        } else {
            0.0
        };

        (tam_score + sam_bonus).min(100.0)
    }

    /// Growth-rate banding plus trend-keyword bonus
    fn growth_score(metrics: &BTreeMap<String, f64>, text_lower: &str) -> f64 {
        let growth = metrics.get("growth_rate").copied().unwrap_or_default();
        let base = if growth >= 20.0 {
            90.0
        } else if growth >= 10.0 {
            75.0
        } else if growth >= 5.0 {
            60.0
        } else {
            40.0
        };

        let bonus = keyword_hits(text_lower, GROWTH_KEYWORDS) as f64 * 5.0;
        (base + bonus).min(100.0)
    }

    /// Competition density penalty: more mentions, lower score
    fn competition_score(text_lower: &str) -> f64 {
        match keyword_hits(text_lower, COMPETITION_KEYWORDS) {
            0 => 85.0,
            1..=2 => 70.0,
            3..=5 => 55.0,
            _ => 40.0,
        }
    }

    /// Timing from positive/negative trend keyword balance
    fn timing_score(text_lower: &str) -> f64 {
        let positive = keyword_hits(text_lower, TIMING_POSITIVE) as f64 * 10.0;
        let negative = keyword_hits(text_lower, TIMING_NEGATIVE) as f64 * 10.0;
        (60.0 + positive - negative).clamp(20.0, 100.0)
    }
}

#[async_trait]
impl CategoryAgent for MarketAgent {
    fn category(&self) -> Category {
        Category::Market
    }

    async fn analyze(
        &self,
        document_text: &str,
        _context: &AnalysisContext,
    ) -> deal_core::Result<AgentResult> {
        let start = Instant::now();

        let raw_metrics = self.extractor.extract_map(document_text);
        let prompt = prompts::analysis_prompt(
            Category::Market,
            prompts::excerpt(document_text, self.config.max_prompt_chars),
        );
        let consensus = self.judge.judge(Category::Market, &prompt).await;

        let text_lower = document_text.to_lowercase();
        let component_scores: BTreeMap<String, f64> = [
            (
                "market_size".to_string(),
                Self::market_size_score(&raw_metrics),
            ),
            (
                "growth_rate".to_string(),
                Self::growth_score(&raw_metrics, &text_lower),
            ),
            (
                "competition_density".to_string(),
                Self::competition_score(&text_lower),
            ),
            ("market_timing".to_string(), Self::timing_score(&text_lower)),
        ]
        .into_iter()
        .collect();

        let calculated = weighted_mean(&component_scores, &WEIGHT_FACTORS);
        let final_score = blend(consensus.score, calculated, self.config.llm_blend_weight);
        let components: Vec<f64> = component_scores.values().copied().collect();
        let confidence = agreement_confidence(&components, self.config.subscore_sigma_scale);

        debug!(
            llm_score = consensus.score,
            calculated, final_score, "market analysis scored"
        );

        // Extracted size/growth figures lead the evidence list, trend
        // excerpts follow
        let mut evidence: Vec<Evidence> = raw_metrics
            .iter()
            .filter(|(_, value)| **value > 0.0)
            .map(|(name, value)| Evidence::metric(EvidenceKind::MarketMetric, name, *value, 0.8))
            .collect();
        evidence.extend(pattern_excerpts(
            document_text,
            &self.evidence_patterns,
            EvidenceKind::MarketTrend,
            0.7,
            2,
        ));

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
                Category::Market,
                &raw_metrics,
            )),
        );

        Ok(AgentResult::new(Category::Market, final_score, confidence)
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
    fn test_tam_banding() {
        assert_eq!(MarketAgent::market_size_score(&metrics(&[("tam", 150.0)])), 95.0);
        assert_eq!(MarketAgent::market_size_score(&metrics(&[("tam", 50.0)])), 85.0);
        assert_eq!(MarketAgent::market_size_score(&metrics(&[("tam", 5.0)])), 70.0);
        assert_eq!(MarketAgent::market_size_score(&metrics(&[("tam", 0.5)])), 50.0);
        assert_eq!(MarketAgent::market_size_score(&BTreeMap::new()), 30.0);
    }

    #[test]
    fn test_sam_bonus_requires_credible_ratio() {
        // 10% of TAM: credible
        assert_eq!(
            MarketAgent::market_size_score(&metrics(&[("tam", 100.0), ("sam", 10.0)])),
            100.0
        );
        // 80% of TAM: not credible, no bonus
        assert_eq!(
            MarketAgent::market_size_score(&metrics(&[("tam", 100.0), ("sam", 80.0)])),
            95.0
        );
    }

    #[test]
    fn test_competition_penalty() {
        assert_eq!(MarketAgent::competition_score("wide open space"), 85.0);
        assert_eq!(MarketAgent::competition_score("one competitor exists"), 70.0);
        assert_eq!(
            MarketAgent::competition_score("competitor competitive crowded"),
            55.0
        );
        assert_eq!(
            MarketAgent::competition_score("competitor competitive crowded saturated and more"),
            55.0
        );
    }

    #[test]
    fn test_timing_balance() {
        assert_eq!(MarketAgent::timing_score("nothing notable"), 60.0);
        assert_eq!(
            MarketAgent::timing_score("big opportunity, strong demand, emerging trend"),
            90.0
        );
        assert_eq!(
            MarketAgent::timing_score("declining, mature, saturated, late to market"),
            20.0
        );
    }

    #[test]
    fn test_growth_banding_with_trend_bonus() {
        assert_eq!(MarketAgent::growth_score(&metrics(&[("growth_rate", 25.0)]), ""), 90.0);
        assert_eq!(
            MarketAgent::growth_score(&metrics(&[("growth_rate", 25.0)]), "booming and expanding"),
            100.0
        );
        assert_eq!(MarketAgent::growth_score(&BTreeMap::new(), ""), 40.0);
    }
}
