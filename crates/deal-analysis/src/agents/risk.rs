//! Risk analysis agent
//!
//! Scores are inverted risk: higher means lower risk. This agent runs last
//! and reads the Finance result out of the analysis context for its
//! financial-risk sub-score. It must never fail: downstream aggregation
//! requires a Risk result to exist, so any internal or LLM failure is
//! replaced with a fixed deterministic narrative.

use crate::agents::{
    agreement_confidence, blend, calculation_details, extras_value, keyword_hits, weighted_mean,
};
use crate::config::AnalysisConfig;
use crate::consensus::EnsembleJudge;
use crate::error::Result;
use crate::fallback;
use crate::prompts;
use async_trait::async_trait;
use deal_core::{
    AgentResult, AnalysisContext, Category, CategoryAgent, Evidence, EvidenceKind,
};
use deal_llm::InferenceProvider;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const WEIGHT_FACTORS: [(&str, f64); 5] = [
    ("market_risk", 0.25),
    ("execution_risk", 0.25),
    ("financial_risk", 0.2),
    ("competitive_risk", 0.15),
    ("regulatory_risk", 0.15),
];

const MARKET_RISK_KEYWORDS: &[&str] = &[
    "unproven market",
    "early market",
    "market timing",
    "adoption risk",
];
const EXECUTION_RISK_KEYWORDS: &[&str] =
    &["inexperienced team", "complex product", "scaling challenges"];
const COMPETITIVE_RISK_KEYWORDS: &[&str] =
    &["crowded market", "strong competitors", "low barriers"];
const REGULATORY_RISK_KEYWORDS: &[&str] = &["regulatory", "compliance", "legal", "patent"];
const MITIGATION_KEYWORDS: &[&str] = &["mitigation", "strategy", "plan", "address", "manage"];

const RISK_PATTERNS: &[&str] = &[
    r"(risk[^.\n]*?(?:market|competition|execution|financial|regulatory))",
    r"(challenge[^.\n]*?(?:scaling|funding|adoption))",
    r"(concern[^.\n]*?(?:team|product|market))",
];

/// A specific risk pulled from the narrative
#[derive(Debug, Clone, Serialize)]
struct IdentifiedRisk {
    description: String,
    severity: &'static str,
    category: &'static str,
}

/// Mitigation posture signals found in the document
#[derive(Debug, Clone, Serialize)]
struct MitigationAssessment {
    mitigation_mentioned: bool,
    mitigation_score: f64,
    has_contingency_plans: bool,
}

/// Scores the five risk sub-categories, leaning on the Finance result
pub struct RiskAgent {
    judge: EnsembleJudge,
    risk_patterns: Vec<Regex>,
    config: Arc<AnalysisConfig>,
}

impl RiskAgent {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: Arc<AnalysisConfig>) -> Result<Self> {
        Ok(Self {
            judge: EnsembleJudge::new(provider, &config)?,
            risk_patterns: RISK_PATTERNS
                .iter()
                .map(|p| Ok(RegexBuilder::new(p).case_insensitive(true).build()?))
                .collect::<Result<Vec<_>>>()?,
            config,
        })
    }

    /// Keyword-penalty sub-scores; financial risk mirrors the Finance score
    fn risk_scores(text_lower: &str, context: &AnalysisContext) -> BTreeMap<String, f64> {
        let penalty = |keywords: &[&str], base: f64, per_hit: f64, floor: f64| {
            (base - keyword_hits(text_lower, keywords) as f64 * per_hit).max(floor)
        };

        [
            (
                "market_risk".to_string(),
                penalty(MARKET_RISK_KEYWORDS, 80.0, 15.0, 30.0),
            ),
            (
                "execution_risk".to_string(),
                penalty(EXECUTION_RISK_KEYWORDS, 80.0, 15.0, 30.0),
            ),
            (
                "financial_risk".to_string(),
                context.score(Category::Finance).unwrap_or(60.0),
            ),
            (
                "competitive_risk".to_string(),
                penalty(COMPETITIVE_RISK_KEYWORDS, 80.0, 15.0, 30.0),
            ),
            (
                "regulatory_risk".to_string(),
                penalty(REGULATORY_RISK_KEYWORDS, 85.0, 10.0, 40.0),
            ),
        ]
        .into_iter()
        .collect()
    }

    /// Pull specific risk mentions out of the narrative and document
    fn identify_risks(&self, combined_text: &str) -> Vec<IdentifiedRisk> {
        let mut risks = Vec::new();
        for pattern in &self.risk_patterns {
            for captures in pattern.captures_iter(combined_text).take(5) {
                if let Some(matched) = captures.get(1) {
                    let description = matched.as_str().trim().to_string();
                    let category = Self::categorize_risk(&description);
                    risks.push(IdentifiedRisk {
                        description,
                        severity: "medium",
                        category,
                    });
                }
            }
        }
        risks
    }

    fn categorize_risk(description: &str) -> &'static str {
        let lower = description.to_lowercase();
        if ["market", "demand", "adoption"].iter().any(|k| lower.contains(k)) {
            "market_risk"
        } else if ["team", "execution", "product"].iter().any(|k| lower.contains(k)) {
            "execution_risk"
        } else if ["financial", "funding", "burn"].iter().any(|k| lower.contains(k)) {
            "financial_risk"
        } else if lower.contains("competit") {
            "competitive_risk"
        } else if ["regulatory", "legal", "compliance"].iter().any(|k| lower.contains(k)) {
            "regulatory_risk"
        } else {
            "general_risk"
        }
    }

    fn mitigation_assessment(text_lower: &str) -> MitigationAssessment {
        let mentions = keyword_hits(text_lower, MITIGATION_KEYWORDS);
        MitigationAssessment {
            mitigation_mentioned: mentions > 0,
            mitigation_score: (mentions as f64 * 20.0).min(100.0),
            has_contingency_plans: text_lower.contains("contingency")
                || text_lower.contains("backup"),
        }
    }

    async fn run(
        &self,
        document_text: &str,
        context: &AnalysisContext,
    ) -> Result<AgentResult> {
        let start = Instant::now();

        let prompt = prompts::analysis_prompt(
            Category::Risk,
            prompts::excerpt(document_text, self.config.max_prompt_chars),
        );
        let consensus = self.judge.judge(Category::Risk, &prompt).await;

        let text_lower = document_text.to_lowercase();
        let component_scores = Self::risk_scores(&text_lower, context);

        let calculated = weighted_mean(&component_scores, &WEIGHT_FACTORS);
        let final_score = blend(consensus.score, calculated, self.config.llm_blend_weight);
        let components: Vec<f64> = component_scores.values().copied().collect();
        let confidence = agreement_confidence(&components, self.config.subscore_sigma_scale);

        debug!(
            llm_score = consensus.score,
            calculated, final_score, "risk analysis scored"
        );

        let combined_text = format!("{} {}", consensus.detail, document_text);
        let identified_risks = self.identify_risks(&combined_text);

        let evidence: Vec<Evidence> = identified_risks
            .iter()
            .take(3)
            .map(|risk| {
                Evidence::derived(
                    EvidenceKind::RiskFactor,
                    format!("[{}] {}", risk.category, risk.description),
                    0.7,
                )
            })
            .collect();

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
            "identified_risks".to_string(),
            extras_value(&identified_risks),
        );
        details.extras.insert(
            "risk_mitigation".to_string(),
            extras_value(&Self::mitigation_assessment(&text_lower)),
        );

        Ok(AgentResult::new(Category::Risk, final_score, confidence)
            .with_summary(prompts::truncate_chars(&consensus.text, 500))
            .with_detailed_analysis(consensus.detail.clone())
            .with_evidence(evidence)
            .with_normalized_metrics(component_scores)
            .with_calculation_details(details)
            .with_processing_time(start.elapsed()))
    }
}

#[async_trait]
impl CategoryAgent for RiskAgent {
    fn category(&self) -> Category {
        Category::Risk
    }

    /// Never raises: a failed run degrades to the fixed fallback result
    async fn analyze(
        &self,
        document_text: &str,
        context: &AnalysisContext,
    ) -> deal_core::Result<AgentResult> {
        match self.run(document_text, context).await {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!(%error, "risk analysis failed, substituting fixed fallback");
                Ok(fallback::agent_fallback(Category::Risk))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_penalties_floor() {
        let text = "unproven market, early market, market timing uncertainty, adoption risk";
        let scores = RiskAgent::risk_scores(text, &AnalysisContext::new());
        // Four hits at 15 each from base 80 hits the floor of 30
        assert_eq!(scores["market_risk"], 30.0);
        // No execution keywords present
        assert_eq!(scores["execution_risk"], 80.0);
    }

    #[test]
    fn test_financial_risk_mirrors_finance_score() {
        let mut context = AnalysisContext::new();
        context.insert(AgentResult::new(Category::Finance, 82.0, 0.8));
        let scores = RiskAgent::risk_scores("", &context);
        assert_eq!(scores["financial_risk"], 82.0);

        let scores = RiskAgent::risk_scores("", &AnalysisContext::new());
        assert_eq!(scores["financial_risk"], 60.0);
    }

    #[test]
    fn test_regulatory_penalty_uses_own_scale() {
        let scores = RiskAgent::risk_scores("regulatory compliance", &AnalysisContext::new());
        // Two hits at 10 each from base 85
        assert_eq!(scores["regulatory_risk"], 65.0);
    }

    #[test]
    fn test_risk_categorization() {
        assert_eq!(RiskAgent::categorize_risk("market adoption risk"), "market_risk");
        assert_eq!(RiskAgent::categorize_risk("team scaling concern"), "execution_risk");
        assert_eq!(RiskAgent::categorize_risk("burn rate pressure"), "financial_risk");
        assert_eq!(RiskAgent::categorize_risk("competitive moat erosion"), "competitive_risk");
        assert_eq!(RiskAgent::categorize_risk("legal exposure"), "regulatory_risk");
        assert_eq!(RiskAgent::categorize_risk("something else entirely"), "general_risk");
    }

    #[test]
    fn test_mitigation_assessment() {
        let assessment =
            RiskAgent::mitigation_assessment("our mitigation strategy and contingency plan");
        assert!(assessment.mitigation_mentioned);
        assert!(assessment.has_contingency_plans);
        // mitigation + strategy + plan = three distinct hits
        assert_eq!(assessment.mitigation_score, 60.0);
    }
}
