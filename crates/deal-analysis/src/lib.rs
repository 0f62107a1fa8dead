//! Pitch analysis framework
//!
//! This crate turns noisy, partially-missing LLM and heuristic judgments
//! about a startup pitch into a single calibrated, explainable investment
//! score. It includes:
//!
//! - Metric extraction from pitch text via ordered pattern rules
//! - Five category agents (Founder, Market, Traction, Finance, Risk), each
//!   blending an LLM judgment with deterministic sub-scores
//! - Ensemble consensus across repeated, temperature-varied model calls
//! - Multi-method statistical normalization (min-max, z-score, log-scale)
//! - Weighted composite aggregation with partial-coverage renormalization
//! - Cohort benchmarking with static-band degradation
//! - A calibrated success probability model
//! - An orchestrator that tolerates individual agent failures
//!
//! # Architecture
//!
//! Data flows one way: text -> extraction/LLM -> category agents ->
//! orchestrator -> composite scoring/benchmarking/probability -> report.
//! Every failure class degrades to a deterministic, flagged,
//! lower-confidence result; callers always receive a structurally complete
//! report and read reliability off confidence values and fallback flags.
//!
//! # Example
//!
//! ```rust,ignore
//! use deal_analysis::{AnalysisConfig, Orchestrator};
//! use deal_llm::providers::OpenAICompatProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = Arc::new(OpenAICompatProvider::from_env()?);
//!     let config = Arc::new(AnalysisConfig::default());
//!
//!     let orchestrator = Orchestrator::new(provider, config);
//!     let report = orchestrator
//!         .run_comprehensive_analysis("pitch text...", None)
//!         .await;
//!     println!("{:.1} -> {}", report.overall_score, report.recommendation.recommendation);
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod config;
pub mod consensus;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod finance_math;
pub mod orchestrator;
pub mod preferences;
pub mod prompts;
pub mod report;
pub mod score_parse;
pub mod scoring;

// Re-export main types for convenience
pub use agents::{FinanceAgent, FounderAgent, MarketAgent, RiskAgent, TractionAgent};
pub use config::AnalysisConfig;
pub use consensus::{Consensus, EnsembleJudge, Prediction};
pub use error::{AnalysisError, Result};
pub use extractor::{ExtractedMetric, MetricExtractor};
pub use orchestrator::{AnalysisPhase, Orchestrator};
pub use preferences::{InvestorPreferences, RiskTolerance};
pub use report::{
    AnalysisMetadata, CompositeResult, ConvictionLevel, Recommendation, RecommendationSummary,
};
pub use score_parse::{HeuristicScorePolicy, ParsedResponse, ScoreParser};
pub use scoring::{
    BenchmarkEngine, BenchmarkReport, CategoryBenchmark, CohortStats, CohortStore,
    CompositeScore, CompositeScorer, InMemoryCohortStore, NormalizationEngine,
    NormalizationMethod, PerformanceBand, ReferenceStats, ScoreExplanation, SuccessBand,
    SuccessForecast, SuccessProbabilityModel,
};

// Re-export the core data model
pub use deal_core::{
    AgentOutcome, AgentResult, AnalysisContext, CalculationDetails, Category, CategoryAgent,
    Evidence, EvidenceKind, EvidenceSource,
};
