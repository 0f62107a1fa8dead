//! Analysis orchestration
//!
//! Runs the four independent category agents concurrently, then Risk with
//! the others' results as read-only context, then aggregates. Any subset of
//! agent failures is absorbed: each failed agent is replaced by the fixed
//! fallback result and the pipeline still reaches `Done`. Partial results
//! are never discarded wholesale; the composite scorer prices missing
//! coverage into its confidence instead.

use crate::agents::{FinanceAgent, FounderAgent, MarketAgent, RiskAgent, TractionAgent};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fallback;
use crate::preferences::InvestorPreferences;
use crate::report::{AnalysisMetadata, CompositeResult, RecommendationSummary};
use crate::scoring::{
    BenchmarkEngine, BenchmarkReport, CohortStore, CompositeScorer, InMemoryCohortStore,
    SuccessProbabilityModel,
};
use chrono::Utc;
use deal_core::{AgentOutcome, AgentResult, AnalysisContext, Category, CategoryAgent};
use deal_llm::InferenceProvider;
use deal_utils::Numerics;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Pipeline phase, for logging and progress reporting
///
/// Degraded agent runs are not a phase: they are absorbed during
/// `AgentsRunning` and the pipeline still reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    NotStarted,
    AgentsRunning,
    Aggregating,
    Done,
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisPhase::NotStarted => "not_started",
            AnalysisPhase::AgentsRunning => "agents_running",
            AnalysisPhase::Aggregating => "aggregating",
            AnalysisPhase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Coordinates the category agents and the scoring engines
pub struct Orchestrator {
    provider: Arc<dyn InferenceProvider>,
    config: Arc<AnalysisConfig>,
    cohort_store: Arc<dyn CohortStore>,
    numerics: Option<Arc<dyn Numerics>>,
    agent_overrides: BTreeMap<Category, Arc<dyn CategoryAgent>>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: Arc<AnalysisConfig>) -> Self {
        Self {
            provider,
            config,
            cohort_store: Arc::new(InMemoryCohortStore::new()),
            numerics: None,
            agent_overrides: BTreeMap::new(),
        }
    }

    /// Attach a cohort statistics store for benchmarking
    pub fn with_cohort_store(mut self, store: Arc<dyn CohortStore>) -> Self {
        self.cohort_store = store;
        self
    }

    /// Swap the numeric backend used by the scoring engines
    pub fn with_numerics(mut self, numerics: Arc<dyn Numerics>) -> Self {
        self.numerics = Some(numerics);
        self
    }

    /// Replace the built-in agent for the override's category
    pub fn with_agent(mut self, agent: Arc<dyn CategoryAgent>) -> Self {
        self.agent_overrides.insert(agent.category(), agent);
        self
    }

    /// Construct the agent for a category (exhaustive over the closed set)
    fn agent_for(&self, category: Category) -> Result<Arc<dyn CategoryAgent>> {
        if let Some(agent) = self.agent_overrides.get(&category) {
            return Ok(Arc::clone(agent));
        }

        let provider = Arc::clone(&self.provider);
        let config = Arc::clone(&self.config);

        Ok(match category {
            Category::Founder => Arc::new(FounderAgent::new(provider, config)?),
            Category::Market => Arc::new(MarketAgent::new(provider, config)?),
            Category::Traction => Arc::new(TractionAgent::new(provider, config)?),
            Category::Finance => Arc::new(FinanceAgent::new(provider, config)?),
            Category::Risk => Arc::new(RiskAgent::new(provider, config)?),
        })
    }

    /// Analyze a single category
    ///
    /// Unlike the comprehensive pipeline, failures here surface to the
    /// caller: a one-off category analysis has no aggregation to protect.
    pub async fn analyze_category(
        &self,
        category: Category,
        document_text: &str,
        context: &AnalysisContext,
    ) -> Result<AgentResult> {
        let agent = self.agent_for(category)?;
        Ok(agent.analyze(document_text, context).await?)
    }

    /// Run one agent, converting any failure into a degraded fallback
    async fn run_guarded(
        &self,
        category: Category,
        document_text: &str,
        context: &AnalysisContext,
    ) -> AgentOutcome {
        let agent = match self.agent_for(category) {
            Ok(agent) => agent,
            Err(error) => {
                warn!(%category, %error, "agent construction failed, substituting fallback");
                return AgentOutcome::Degraded(
                    fallback::agent_fallback(category),
                    error.to_string(),
                );
            }
        };

        match agent.analyze(document_text, context).await {
            Ok(result) => {
                info!(
                    %category,
                    score = result.score,
                    confidence = result.confidence,
                    "agent completed"
                );
                AgentOutcome::Ok(result)
            }
            Err(error) => {
                warn!(%category, %error, "agent failed, substituting fallback");
                AgentOutcome::Degraded(fallback::agent_fallback(category), error.to_string())
            }
        }
    }

    /// Run all agents and compile the comprehensive analysis
    pub async fn run_comprehensive_analysis(
        &self,
        document_text: &str,
        preferences: Option<InvestorPreferences>,
    ) -> CompositeResult {
        let start = Instant::now();
        let preferences = preferences.unwrap_or_default();
        let weights = preferences.effective_weights();

        let mut phase = AnalysisPhase::AgentsRunning;
        info!(%phase, "starting comprehensive analysis");

        let base_context = AnalysisContext::new();
        let (founder, market, traction, finance) = tokio::join!(
            self.run_guarded(Category::Founder, document_text, &base_context),
            self.run_guarded(Category::Market, document_text, &base_context),
            self.run_guarded(Category::Traction, document_text, &base_context),
            self.run_guarded(Category::Finance, document_text, &base_context),
        );

        // Risk runs last with everything completed so far as context
        let mut risk_context = AnalysisContext::new();
        let first_wave = [founder, market, traction, finance];
        for outcome in &first_wave {
            if let Some(result) = outcome.result() {
                risk_context.insert(result.clone());
            }
        }
        let risk = self
            .run_guarded(Category::Risk, document_text, &risk_context)
            .await;

        phase = AnalysisPhase::Aggregating;
        info!(%phase, "aggregating agent results");

        let mut agent_results: BTreeMap<Category, AgentResult> = BTreeMap::new();
        let mut degraded_categories = Vec::new();
        for outcome in first_wave.into_iter().chain([risk]) {
            match outcome {
                AgentOutcome::Ok(result) => {
                    agent_results.insert(result.category, result);
                }
                AgentOutcome::Degraded(result, reason) => {
                    warn!(category = %result.category, %reason, "category degraded");
                    degraded_categories.push(result.category);
                    agent_results.insert(result.category, result);
                }
                AgentOutcome::Fatal(reason) => {
                    // No result to carry; the category is simply absent and
                    // the composite renormalizes around it.
                    warn!(%reason, "category lost entirely");
                }
            }
        }

        let scores: BTreeMap<Category, f64> = agent_results
            .iter()
            .map(|(category, result)| (*category, result.score))
            .collect();

        let scorer = CompositeScorer::with_weights(weights.clone())
            .with_consistency_sigma(self.config.composite_sigma_scale)
            .with_outlier_threshold(self.config.outlier_threshold);
        let composite = scorer.score(&scores);

        let mut probability_model = SuccessProbabilityModel::new(
            self.config.logistic_steepness,
            self.config.logistic_threshold,
        );
        if let Some(numerics) = &self.numerics {
            probability_model = probability_model.with_numerics(Arc::clone(numerics));
        }
        let success = probability_model.estimate(&composite);

        let recommendation = RecommendationSummary::derive(
            composite.composite_score,
            preferences.min_overall_score,
        );
        let key_insights = Self::key_insights(&agent_results);
        let next_steps = Self::next_steps(composite.composite_score, &agent_results);
        let explanation = scorer.explain(&scores);

        phase = AnalysisPhase::Done;
        info!(
            %phase,
            overall_score = composite.composite_score,
            confidence = composite.confidence,
            coverage = composite.coverage,
            recommendation = %recommendation.recommendation,
            "comprehensive analysis complete"
        );

        CompositeResult {
            overall_score: composite.composite_score,
            overall_confidence: composite.confidence,
            coverage: composite.coverage,
            weights_used: composite.weights_used,
            outliers: composite.outliers,
            recommendation,
            success,
            key_insights,
            next_steps,
            explanation,
            metadata: AnalysisMetadata {
                total_processing_time: start.elapsed(),
                agents_run: agent_results.keys().copied().collect(),
                degraded_categories,
                weights_used: weights,
                timestamp: Utc::now(),
            },
            agent_results,
        }
    }

    /// Benchmark category scores against a (vertical, stage) cohort
    pub fn compare_to_benchmarks(
        &self,
        scores: &BTreeMap<Category, f64>,
        vertical: &str,
        stage: &str,
    ) -> BenchmarkReport {
        let mut engine = BenchmarkEngine::new(Arc::clone(&self.cohort_store));
        if let Some(numerics) = &self.numerics {
            engine = engine.with_numerics(Arc::clone(numerics));
        }
        engine.compare(scores, vertical, stage)
    }

    /// Strongest/weakest categories and where confidence is high
    fn key_insights(agent_results: &BTreeMap<Category, AgentResult>) -> Vec<String> {
        let mut insights = Vec::new();

        let strongest = agent_results
            .values()
            .max_by(|a, b| a.score.total_cmp(&b.score));
        let weakest = agent_results
            .values()
            .min_by(|a, b| a.score.total_cmp(&b.score));

        if let (Some(strongest), Some(weakest)) = (strongest, weakest) {
            insights.push(format!(
                "Strongest area: {} (Score: {:.1})",
                strongest.category.title(),
                strongest.score
            ));
            insights.push(format!(
                "Weakest area: {} (Score: {:.1})",
                weakest.category.title(),
                weakest.score
            ));
        }

        let confident: Vec<&str> = agent_results
            .values()
            .filter(|result| result.confidence >= 0.7)
            .map(|result| result.category.title())
            .collect();
        if !confident.is_empty() {
            insights.push(format!(
                "High confidence analysis in: {}",
                confident.join(", ")
            ));
        }

        insights
    }

    /// Up to five next steps driven by the overall score and weak categories
    fn next_steps(
        overall_score: f64,
        agent_results: &BTreeMap<Category, AgentResult>,
    ) -> Vec<String> {
        let mut steps: Vec<String> = if overall_score >= 70.0 {
            vec![
                "Proceed with detailed due diligence".to_string(),
                "Schedule management presentation".to_string(),
            ]
        } else if overall_score >= 50.0 {
            vec![
                "Request additional financial data".to_string(),
                "Validate key assumptions".to_string(),
            ]
        } else {
            vec![
                "Pass on this opportunity".to_string(),
                "Provide feedback to entrepreneur".to_string(),
            ]
        };

        for (category, result) in agent_results {
            if result.score < 50.0 {
                let step = match category {
                    Category::Founder => "Evaluate team strengthening options",
                    Category::Market => "Conduct additional market research",
                    Category::Traction => "Request detailed customer metrics",
                    Category::Finance => "Review financial model assumptions",
                    Category::Risk => "Commission an independent risk assessment",
                };
                steps.push(step.to_string());
            }
        }

        steps.truncate(5);
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_labels() {
        assert_eq!(AnalysisPhase::NotStarted.to_string(), "not_started");
        assert_eq!(AnalysisPhase::Done.to_string(), "done");
    }

    #[test]
    fn test_key_insights_name_extremes() {
        let mut results = BTreeMap::new();
        results.insert(
            Category::Founder,
            AgentResult::new(Category::Founder, 82.0, 0.9),
        );
        results.insert(
            Category::Finance,
            AgentResult::new(Category::Finance, 41.0, 0.3),
        );

        let insights = Orchestrator::key_insights(&results);
        assert!(insights[0].contains("Founder"));
        assert!(insights[1].contains("Finance"));
        assert!(insights[2].contains("High confidence"));
        assert!(insights[2].contains("Founder"));
        assert!(!insights[2].contains("Finance"));
    }

    #[test]
    fn test_next_steps_cap_and_weak_category_followups() {
        let mut results = BTreeMap::new();
        for category in Category::ALL {
            results.insert(category, AgentResult::new(category, 30.0, 0.5));
        }

        let steps = Orchestrator::next_steps(30.0, &results);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], "Pass on this opportunity");
        assert!(steps.iter().any(|s| s.contains("team strengthening")));
    }

    #[test]
    fn test_next_steps_for_strong_overall() {
        let mut results = BTreeMap::new();
        for category in Category::ALL {
            results.insert(category, AgentResult::new(category, 80.0, 0.8));
        }

        let steps = Orchestrator::next_steps(80.0, &results);
        assert_eq!(
            steps,
            vec![
                "Proceed with detailed due diligence".to_string(),
                "Schedule management presentation".to_string(),
            ]
        );
    }
}
