//! Founder analysis agent

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
use deal_core::{AgentResult, AnalysisContext, Category, CategoryAgent, EvidenceKind};
use deal_llm::InferenceProvider;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const METRIC_RULES: &[(&str, &str)] = &[
    ("years_experience", r"(\d+)\s*years?\s*(?:of\s*)?experience"),
    ("previous_exits", r"(?:sold|exit|acquired).*?(\d+)"),
    ("team_size", r"(?:team|founders?).*?(\d+)"),
];

const WEIGHT_FACTORS: [(&str, f64); 4] = [
    ("experience", 0.3),
    ("domain_expertise", 0.25),
    ("track_record", 0.25),
    ("team_complementarity", 0.2),
];

const SENIORITY_KEYWORDS: &[&str] = &["senior", "lead", "director", "vp", "cto", "ceo", "founder"];
const SUCCESS_KEYWORDS: &[&str] = &["successful", "profitable", "growth", "scale", "raised"];
const ROLE_KEYWORDS: &[&str] = &[
    "ceo",
    "cto",
    "cfo",
    "cmo",
    "technical",
    "business",
    "marketing",
    "sales",
];
const DIVERSITY_KEYWORDS: &[&str] = &["diverse", "complementary", "balanced", "experienced"];

const EVIDENCE_PATTERNS: &[&str] = &[
    r"([A-Z][a-z]+\s+[A-Z][a-z]+)\s*,?\s*(?:CEO|CTO|founder)",
    r"(\d+\s*years?\s*(?:of\s*)?experience)",
    r"(previously\s+(?:founded|worked|led)[^.\n]*)",
];

/// Relevant keywords per sector for domain-expertise matching
fn sector_keywords(sector: &str) -> &'static [&'static str] {
    match sector {
        "fintech" => &["finance", "banking", "payment", "financial"],
        "healthcare" => &["health", "medical", "clinical", "pharma"],
        "saas" => &["software", "platform", "api", "cloud"],
        "ecommerce" => &["retail", "commerce", "marketplace", "shopping"],
        _ => &[],
    }
}

/// Scores founder experience, domain fit, track record, and team shape
pub struct FounderAgent {
    judge: EnsembleJudge,
    extractor: MetricExtractor,
    evidence_patterns: Vec<Regex>,
    normalizer: NormalizationEngine,
    config: Arc<AnalysisConfig>,
}

impl FounderAgent {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: Arc<AnalysisConfig>) -> Result<Self> {
        Ok(Self {
            judge: EnsembleJudge::new(provider, &config)?,
            extractor: MetricExtractor::new(Category::Founder, METRIC_RULES)?,
            evidence_patterns: EVIDENCE_PATTERNS
                .iter()
                .map(|p| {
                    Ok(RegexBuilder::new(p).case_insensitive(true).build()?)
                })
                .collect::<Result<Vec<_>>>()?,
            normalizer: NormalizationEngine::new(config.normalization_method),
            config,
        })
    }

    /// Experience years banding plus seniority-keyword bonus
    fn experience_score(metrics: &BTreeMap<String, f64>, text_lower: &str) -> f64 {
        let years = metrics.get("years_experience").copied().unwrap_or_default();
        let base = if years >= 10.0 {
            90.0
        } else if years >= 5.0 {
            75.0
        } else if years >= 2.0 {
            60.0
        } else {
            40.0
        };

        let bonus = keyword_hits(text_lower, SENIORITY_KEYWORDS) as f64 * 5.0;
        (base + bonus).min(100.0)
    }

    /// Domain relevance against the sector keyword table
    fn domain_score(text_lower: &str, sector: Option<&str>) -> f64 {
        let Some(sector) = sector else {
            return 60.0;
        };

        let keywords = sector_keywords(&sector.to_lowercase());
        if keywords.is_empty() {
            return 60.0;
        }

        let matches = keyword_hits(text_lower, keywords) as f64;
        (40.0 + matches * 15.0).min(100.0)
    }

    /// Prior-exit banding plus success-keyword bonus
    fn track_record_score(metrics: &BTreeMap<String, f64>, text_lower: &str) -> f64 {
        let exits = metrics.get("previous_exits").copied().unwrap_or_default();
        let base = if exits >= 2.0 {
            95.0
        } else if exits >= 1.0 {
            80.0
        } else {
            50.0
        };

        let bonus = keyword_hits(text_lower, SUCCESS_KEYWORDS) as f64 * 3.0;
        (base + bonus).min(100.0)
    }

    /// Role coverage across the executive spectrum plus diversity signals
    fn team_score(text_lower: &str) -> f64 {
        let coverage = keyword_hits(text_lower, ROLE_KEYWORDS) as f64;
        let base = (coverage * 10.0).min(80.0);
        let bonus = keyword_hits(text_lower, DIVERSITY_KEYWORDS) as f64 * 5.0;
        (base + bonus).min(100.0)
    }
}

#[async_trait]
impl CategoryAgent for FounderAgent {
    fn category(&self) -> Category {
        Category::Founder
    }

    async fn analyze(
        &self,
        document_text: &str,
        context: &AnalysisContext,
    ) -> deal_core::Result<AgentResult> {
        let start = Instant::now();

        let raw_metrics = self.extractor.extract_map(document_text);
        let prompt = prompts::analysis_prompt(
            Category::Founder,
            prompts::excerpt(document_text, self.config.max_prompt_chars),
        );
        let consensus = self.judge.judge(Category::Founder, &prompt).await;

        let text_lower = document_text.to_lowercase();
        let component_scores: BTreeMap<String, f64> = [
            (
                "experience".to_string(),
                Self::experience_score(&raw_metrics, &text_lower),
            ),
            (
                "domain_expertise".to_string(),
                Self::domain_score(&text_lower, context.sector()),
            ),
            (
                "track_record".to_string(),
                Self::track_record_score(&raw_metrics, &text_lower),
            ),
            (
                "team_complementarity".to_string(),
                Self::team_score(&text_lower),
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
            calculated, final_score, "founder analysis scored"
        );

        let evidence = pattern_excerpts(
            document_text,
            &self.evidence_patterns,
            EvidenceKind::FounderInfo,
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
                Category::Founder,
                &raw_metrics,
            )),
        );

        Ok(AgentResult::new(Category::Founder, final_score, confidence)
            .with_summary(prompts::truncate_chars(&consensus.text, 500))
            .with_detailed_analysis(consensus.detail.clone())
            .with_evidence(evidence)
            .with_raw_metrics(raw_metrics)
            .with_normalized_metrics(component_scores)
            .with_calculation_details(details)
            .with_processing_time(start.elapsed()))
    }
}
