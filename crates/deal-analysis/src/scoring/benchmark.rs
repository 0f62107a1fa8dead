//! Cohort benchmarking
//!
//! Scores are placed against a (vertical, stage) peer cohort when the
//! store has statistics for it, and against static score bands when it
//! does not. The static path is explicitly lower fidelity but always
//! available, so a missing cohort never becomes an error.

use crate::scoring::normalize::z_to_percentile;
use deal_core::Category;
use deal_utils::{Numerics, StdNumerics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Read-only cohort statistics store
///
/// Missing keys are expected and tolerated; implementations should never
/// fabricate statistics.
pub trait CohortStore: Send + Sync {
    fn stats(&self, vertical: &str, stage: &str, category: Category) -> Option<CohortStats>;
}

/// Distribution statistics for one cohort slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub sample_count: u64,
}

/// In-memory cohort store
#[derive(Debug, Clone, Default)]
pub struct InMemoryCohortStore {
    entries: BTreeMap<(String, String, Category), CohortStats>,
}

impl InMemoryCohortStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cohort entry
    pub fn with_stats(
        mut self,
        vertical: impl Into<String>,
        stage: impl Into<String>,
        category: Category,
        stats: CohortStats,
    ) -> Self {
        self.entries
            .insert((vertical.into(), stage.into(), category), stats);
        self
    }
}

impl CohortStore for InMemoryCohortStore {
    fn stats(&self, vertical: &str, stage: &str, category: Category) -> Option<CohortStats> {
        self.entries
            .get(&(vertical.to_string(), stage.to_string(), category))
            .copied()
    }
}

/// Performance label relative to the cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceBand {
    Exceptional,
    AboveAverage,
    Average,
    BelowAverage,
    Poor,
}

impl PerformanceBand {
    /// Band a cohort percentile: 90/75/50/25 boundaries, inclusive upward
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= 90.0 {
            PerformanceBand::Exceptional
        } else if percentile >= 75.0 {
            PerformanceBand::AboveAverage
        } else if percentile >= 50.0 {
            PerformanceBand::Average
        } else if percentile >= 25.0 {
            PerformanceBand::BelowAverage
        } else {
            PerformanceBand::Poor
        }
    }

    /// Static score banding used without cohort data
    pub fn from_static_score(score: f64) -> Self {
        if score >= 80.0 {
            PerformanceBand::AboveAverage
        } else if score >= 60.0 {
            PerformanceBand::Average
        } else {
            PerformanceBand::BelowAverage
        }
    }
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceBand::Exceptional => "Exceptional",
            PerformanceBand::AboveAverage => "Above Average",
            PerformanceBand::Average => "Average",
            PerformanceBand::BelowAverage => "Below Average",
            PerformanceBand::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// One category's placement against the cohort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBenchmark {
    pub score: f64,
    pub percentile: f64,
    pub performance: PerformanceBand,
    pub cohort_median: f64,
    pub cohort_mean: f64,
    pub sample_size: u64,
    /// False when static bands were used for lack of cohort data
    pub cohort_backed: bool,
}

/// Benchmark placements for a set of category scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub vertical: String,
    pub stage: String,
    pub categories: BTreeMap<Category, CategoryBenchmark>,
}

/// Places scores against cohort statistics
pub struct BenchmarkEngine {
    store: Arc<dyn CohortStore>,
    numerics: Arc<dyn Numerics>,
}

impl BenchmarkEngine {
    pub fn new(store: Arc<dyn CohortStore>) -> Self {
        Self {
            store,
            numerics: Arc::new(StdNumerics),
        }
    }

    /// Swap the numeric backend (construction-time choice)
    pub fn with_numerics(mut self, numerics: Arc<dyn Numerics>) -> Self {
        self.numerics = numerics;
        self
    }

    /// Benchmark each score against the (vertical, stage) cohort
    pub fn compare(
        &self,
        scores: &BTreeMap<Category, f64>,
        vertical: &str,
        stage: &str,
    ) -> BenchmarkReport {
        let categories = scores
            .iter()
            .map(|(category, score)| {
                let benchmark = match self.store.stats(vertical, stage, *category) {
                    Some(stats) => self.cohort_benchmark(*score, stats),
                    None => Self::static_benchmark(*score),
                };
                (*category, benchmark)
            })
            .collect();

        BenchmarkReport {
            vertical: vertical.to_string(),
            stage: stage.to_string(),
            categories,
        }
    }

    fn cohort_benchmark(&self, score: f64, stats: CohortStats) -> CategoryBenchmark {
        let percentile = if stats.std == 0.0 {
            50.0
        } else {
            let z = (score - stats.mean) / stats.std;
            (z_to_percentile(self.numerics.as_ref(), z) * 100.0).clamp(0.0, 100.0)
        };

        CategoryBenchmark {
            score,
            percentile,
            performance: PerformanceBand::from_percentile(percentile),
            cohort_median: stats.median,
            cohort_mean: stats.mean,
            sample_size: stats.sample_count,
            cohort_backed: true,
        }
    }

    fn static_benchmark(score: f64) -> CategoryBenchmark {
        CategoryBenchmark {
            score,
            percentile: score.clamp(0.0, 100.0),
            performance: PerformanceBand::from_static_score(score),
            cohort_median: 50.0,
            cohort_mean: 50.0,
            sample_size: 0,
            cohort_backed: false,
        }
    }

    /// Percentile rank of a raw metric against cohort quartiles
    ///
    /// Piecewise-linear interpolation across p25/p50/p75/p90, extrapolating
    /// beyond p90 (10% per additional p90-decile) and below p25
    /// (proportionally toward zero). For raw metric benchmarking where a
    /// mean/std pair is too coarse.
    pub fn percentile_from_quartiles(value: f64, stats: &CohortStats) -> f64 {
        let (p25, p50, p75, p90) = (stats.p25, stats.median, stats.p75, stats.p90);

        let percentile = if value >= p90 {
            if p90 > 0.0 {
                90.0 + (value - p90) / (p90 * 0.1) * 10.0
            } else {
                90.0
            }
        } else if value >= p75 {
            75.0 + (value - p75) / (p90 - p75) * 15.0
        } else if value >= p50 {
            50.0 + (value - p50) / (p75 - p50) * 25.0
        } else if value >= p25 {
            25.0 + (value - p25) / (p50 - p25) * 25.0
        } else if p25 > 0.0 {
            25.0 * value / p25
        } else {
            0.0
        };

        percentile.clamp(0.0, 100.0)
    }
}
