//! Final analysis report types

use crate::scoring::{ScoreExplanation, SuccessForecast};
use chrono::{DateTime, Utc};
use deal_core::{AgentResult, Category};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Investment recommendation bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Consider,
    Caution,
    Pass,
}

impl Recommendation {
    /// Band an overall score: 80/70/60/50 boundaries, inclusive upward
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Recommendation::StrongBuy
        } else if score >= 70.0 {
            Recommendation::Buy
        } else if score >= 60.0 {
            Recommendation::Consider
        } else if score >= 50.0 {
            Recommendation::Caution
        } else {
            Recommendation::Pass
        }
    }

    fn rationale(self) -> &'static str {
        match self {
            Recommendation::StrongBuy => {
                "Exceptional startup with strong fundamentals across all categories"
            }
            Recommendation::Buy => "Solid investment opportunity with good potential",
            Recommendation::Consider => "Moderate opportunity, requires careful evaluation",
            Recommendation::Caution => "Below average opportunity with significant risks",
            Recommendation::Pass => "High risk investment with poor fundamentals",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Consider => "Consider",
            Recommendation::Caution => "Caution",
            Recommendation::Pass => "Pass",
        };
        f.write_str(label)
    }
}

/// How firmly the recommendation is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvictionLevel {
    High,
    Medium,
}

/// Recommendation with its rationale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub recommendation: Recommendation,
    pub rationale: String,
    /// High conviction at the extremes of the score range, medium between
    pub conviction: ConvictionLevel,
}

impl RecommendationSummary {
    /// Derive the recommendation, honoring an investor-supplied minimum
    pub fn derive(overall_score: f64, min_overall_score: Option<f64>) -> Self {
        let banded = Recommendation::from_score(overall_score);
        let mut rationale = banded.rationale().to_string();

        let recommendation = match min_overall_score {
            Some(min) if overall_score < min => {
                rationale.push_str(&format!(" (Below investor minimum score of {min})"));
                Recommendation::Pass
            }
            _ => banded,
        };

        let conviction = if overall_score > 75.0 || overall_score < 40.0 {
            ConvictionLevel::High
        } else {
            ConvictionLevel::Medium
        };

        Self {
            recommendation,
            rationale,
            conviction,
        }
    }
}

/// Bookkeeping about the run itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub total_processing_time: Duration,
    /// Categories that produced a result, in canonical order
    pub agents_run: Vec<Category>,
    /// Categories whose result is a substituted fallback
    pub degraded_categories: Vec<Category>,
    /// Effective (normalized) weight map the run started from
    pub weights_used: BTreeMap<Category, f64>,
    pub timestamp: DateTime<Utc>,
}

/// The complete output of a comprehensive analysis
///
/// Derived, never mutated in place: recompute wholesale if inputs change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Weighted overall score in [0, 100]
    pub overall_score: f64,
    /// Composite confidence in [0, 1]
    pub overall_confidence: f64,
    /// Fraction of canonical weight mass backed by completed analyses
    pub coverage: f64,
    /// Renormalized per-category weights actually applied
    pub weights_used: BTreeMap<Category, f64>,
    /// Per-category outlier flags
    pub outliers: BTreeMap<Category, bool>,
    pub recommendation: RecommendationSummary,
    pub success: SuccessForecast,
    pub agent_results: BTreeMap<Category, AgentResult>,
    pub key_insights: Vec<String>,
    pub next_steps: Vec<String>,
    pub explanation: ScoreExplanation,
    pub metadata: AnalysisMetadata,
}
