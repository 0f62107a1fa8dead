//! Command-line interface for deal-rs
//!
//! Reads a plain-text pitch document, runs the comprehensive analysis
//! against an OpenAI-compatible endpoint configured through the
//! environment (`LLM_API_KEY`, `LLM_API_BASE`, `LLM_MODEL_NAME`), and
//! prints the JSON report.

use anyhow::Context as _;
use clap::Parser;
use deal_analysis::{AnalysisConfig, Category, InvestorPreferences, Orchestrator};
use deal_llm::providers::OpenAICompatProvider;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "deal",
    about = "Calibrated investment scoring for startup pitch documents",
    version
)]
struct Cli {
    /// Path to the pre-extracted plain-text pitch document
    document: PathBuf,

    /// Analyze a single category instead of running the full pipeline
    #[arg(long, value_name = "CATEGORY")]
    category: Option<Category>,

    /// Force a Pass recommendation below this overall score
    #[arg(long, value_name = "SCORE")]
    min_score: Option<f64>,

    /// Benchmark the category scores against this cohort vertical
    #[arg(long, requires = "stage")]
    vertical: Option<String>,

    /// Cohort stage, e.g. seed or series_a
    #[arg(long, requires = "vertical")]
    stage: Option<String>,

    /// Per-invocation LLM timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Issue one LLM call per category instead of the ensemble
    #[arg(long)]
    single_sample: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut builder = AnalysisConfig::builder()
            .invocation_timeout(Duration::from_secs(self.timeout));
        if self.single_sample {
            builder = builder.single_sample(0.1);
        }
        Ok(builder.build()?)
    }

    fn preferences(&self) -> Option<InvestorPreferences> {
        self.min_score.map(|min| InvestorPreferences {
            min_overall_score: Some(min),
            ..InvestorPreferences::default()
        })
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deal_utils::init_tracing();

    let cli = Cli::parse();
    let document_text = std::fs::read_to_string(&cli.document)
        .with_context(|| format!("failed to read {}", cli.document.display()))?;

    let provider = Arc::new(OpenAICompatProvider::from_env()?);
    let config = Arc::new(cli.analysis_config()?);
    let orchestrator = Orchestrator::new(provider, config);

    if let Some(category) = cli.category {
        let context = deal_analysis::AnalysisContext::new();
        let result = orchestrator
            .analyze_category(category, &document_text, &context)
            .await?;
        return print_json(&result, cli.pretty);
    }

    let report = orchestrator
        .run_comprehensive_analysis(&document_text, cli.preferences())
        .await;
    info!(
        overall_score = report.overall_score,
        recommendation = %report.recommendation.recommendation,
        "analysis finished"
    );

    if let (Some(vertical), Some(stage)) = (&cli.vertical, &cli.stage) {
        let scores: BTreeMap<Category, f64> = report
            .agent_results
            .iter()
            .map(|(category, result)| (*category, result.score))
            .collect();
        let benchmarks = orchestrator.compare_to_benchmarks(&scores, vertical, stage);
        print_json(&benchmarks, cli.pretty)?;
    }

    print_json(&report, cli.pretty)
}
