//! Metric normalization onto the 0-100 scale
//!
//! Three interchangeable methods over a (category, metric) reference table.
//! Metrics with no reference entry fall back to a direct clip of the raw
//! value: lower fidelity, but a score always comes out.

use deal_core::Category;
use deal_utils::{Numerics, StdNumerics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Normalization method selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    /// Linear rescale between reference min and max
    MinMax,
    /// Z-score mapped through a sigmoid CDF approximation to a percentile
    ZScore,
    /// Log rescale for right-skewed metrics (funding, revenue)
    LogScale,
}

/// Reference distribution for one (category, metric) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

impl ReferenceStats {
    pub fn new(min: f64, max: f64, mean: f64, std: f64) -> Self {
        Self {
            min,
            max,
            mean,
            std,
        }
    }
}

/// Convert a z-score to a percentile in [0, 1]
///
/// Sigmoid approximation of the normal CDF: 0.5 * (1 + tanh(z * sqrt(2/pi))).
/// z is clamped to [-3, 3] first; beyond three sigmas the distinction
/// carries no information at score resolution.
pub fn z_to_percentile(numerics: &dyn Numerics, z: f64) -> f64 {
    let z = z.clamp(-3.0, 3.0);
    0.5 * (1.0 + numerics.tanh(z * (2.0 / std::f64::consts::PI).sqrt()))
}

/// Rescales raw metrics using a reference table
pub struct NormalizationEngine {
    method: NormalizationMethod,
    references: BTreeMap<(Category, String), ReferenceStats>,
    numerics: Arc<dyn Numerics>,
}

impl NormalizationEngine {
    /// Engine with the default reference table and std numerics
    pub fn new(method: NormalizationMethod) -> Self {
        Self {
            method,
            references: default_references(),
            numerics: Arc::new(StdNumerics),
        }
    }

    /// Swap the numeric backend (construction-time choice)
    pub fn with_numerics(mut self, numerics: Arc<dyn Numerics>) -> Self {
        self.numerics = numerics;
        self
    }

    /// Add or replace a reference entry
    pub fn with_reference(
        mut self,
        category: Category,
        metric: impl Into<String>,
        stats: ReferenceStats,
    ) -> Self {
        self.references.insert((category, metric.into()), stats);
        self
    }

    /// Normalize one value with the engine's method
    pub fn normalize(&self, category: Category, metric: &str, value: f64) -> f64 {
        self.normalize_with(category, metric, value, self.method)
    }

    /// Normalize one value with an explicit method
    pub fn normalize_with(
        &self,
        category: Category,
        metric: &str,
        value: f64,
        method: NormalizationMethod,
    ) -> f64 {
        let Some(reference) = self.references.get(&(category, metric.to_string())) else {
            return value.clamp(0.0, 100.0);
        };

        match method {
            NormalizationMethod::MinMax => Self::min_max(value, reference.min, reference.max),
            NormalizationMethod::ZScore => {
                self.z_score(value, reference.mean, reference.std)
            }
            NormalizationMethod::LogScale => self.log_scale(value, reference.max),
        }
    }

    fn min_max(value: f64, min: f64, max: f64) -> f64 {
        if max == min {
            return 50.0;
        }
        (((value - min) / (max - min)) * 100.0).clamp(0.0, 100.0)
    }

    fn z_score(&self, value: f64, mean: f64, std: f64) -> f64 {
        if std == 0.0 {
            return 50.0;
        }
        let z = (value - mean) / std;
        (z_to_percentile(self.numerics.as_ref(), z) * 100.0).clamp(0.0, 100.0)
    }

    fn log_scale(&self, value: f64, max: f64) -> f64 {
        if value <= 0.0 {
            return 0.0;
        }
        let log_max = self.numerics.ln(1.0 + max);
        if log_max == 0.0 {
            return 50.0;
        }
        ((self.numerics.ln(1.0 + value) / log_max) * 100.0).clamp(0.0, 100.0)
    }
}

/// Reference distributions observed across early-stage pitch decks
fn default_references() -> BTreeMap<(Category, String), ReferenceStats> {
    let entries: [(Category, &str, ReferenceStats); 12] = [
        (
            Category::Founder,
            "years_experience",
            ReferenceStats::new(0.0, 20.0, 8.0, 5.0),
        ),
        (
            Category::Founder,
            "previous_exits",
            ReferenceStats::new(0.0, 3.0, 0.5, 0.8),
        ),
        (
            Category::Founder,
            "team_size",
            ReferenceStats::new(1.0, 10.0, 3.0, 2.0),
        ),
        (
            Category::Market,
            "tam",
            ReferenceStats::new(0.1, 1000.0, 50.0, 100.0),
        ),
        (
            Category::Market,
            "growth_rate",
            ReferenceStats::new(0.0, 50.0, 15.0, 10.0),
        ),
        (
            Category::Market,
            "market_share",
            ReferenceStats::new(0.0, 100.0, 20.0, 15.0),
        ),
        (
            Category::Traction,
            "arr",
            ReferenceStats::new(0.0, 100.0, 2.0, 5.0),
        ),
        (
            Category::Traction,
            "growth_rate",
            ReferenceStats::new(0.0, 200.0, 50.0, 40.0),
        ),
        (
            Category::Traction,
            "customers",
            ReferenceStats::new(0.0, 100_000.0, 1000.0, 5000.0),
        ),
        (
            Category::Finance,
            "ltv_cac_ratio",
            ReferenceStats::new(0.0, 10.0, 3.0, 2.0),
        ),
        (
            Category::Finance,
            "runway",
            ReferenceStats::new(0.0, 60.0, 18.0, 12.0),
        ),
        (
            Category::Finance,
            "gross_margin",
            ReferenceStats::new(0.0, 100.0, 70.0, 20.0),
        ),
    ];

    entries
        .into_iter()
        .map(|(category, metric, stats)| ((category, metric.to_string()), stats))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(method: NormalizationMethod) -> NormalizationEngine {
        NormalizationEngine::new(method)
    }

    #[test]
    fn test_min_max_endpoints() {
        let engine = engine(NormalizationMethod::MinMax);
        assert_eq!(engine.normalize(Category::Founder, "years_experience", 0.0), 0.0);
        assert_eq!(
            engine.normalize(Category::Founder, "years_experience", 20.0),
            100.0
        );
        // Midpoint of a symmetric range lands on 50
        assert_eq!(
            engine.normalize(Category::Founder, "years_experience", 10.0),
            50.0
        );
    }

    #[test]
    fn test_min_max_clamps_out_of_range() {
        let engine = engine(NormalizationMethod::MinMax);
        assert_eq!(
            engine.normalize(Category::Founder, "years_experience", 35.0),
            100.0
        );
        assert_eq!(
            engine.normalize(Category::Founder, "years_experience", -4.0),
            0.0
        );
    }

    #[test]
    fn test_degenerate_range_returns_midpoint() {
        let engine = NormalizationEngine::new(NormalizationMethod::MinMax).with_reference(
            Category::Market,
            "flat",
            ReferenceStats::new(5.0, 5.0, 5.0, 0.0),
        );
        assert_eq!(engine.normalize(Category::Market, "flat", 5.0), 50.0);
    }

    #[test]
    fn test_z_score_mean_is_fifty() {
        let engine = engine(NormalizationMethod::ZScore);
        let at_mean = engine.normalize(Category::Founder, "years_experience", 8.0);
        assert!((at_mean - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_z_score_is_monotone_and_bounded() {
        let engine = engine(NormalizationMethod::ZScore);
        let low = engine.normalize(Category::Market, "growth_rate", 2.0);
        let mid = engine.normalize(Category::Market, "growth_rate", 15.0);
        let high = engine.normalize(Category::Market, "growth_rate", 45.0);
        assert!(low < mid && mid < high);
        assert!((0.0..=100.0).contains(&low) && (0.0..=100.0).contains(&high));
    }

    #[test]
    fn test_z_clamped_beyond_three_sigma() {
        let engine = engine(NormalizationMethod::ZScore);
        let extreme = engine.normalize(Category::Market, "growth_rate", 10_000.0);
        let at_three_sigma = engine.normalize(Category::Market, "growth_rate", 45.0);
        assert_eq!(extreme, at_three_sigma);
    }

    #[test]
    fn test_log_scale_endpoints() {
        let engine = engine(NormalizationMethod::LogScale);
        assert_eq!(engine.normalize(Category::Traction, "arr", 0.0), 0.0);
        assert_eq!(engine.normalize(Category::Traction, "arr", -2.0), 0.0);
        let at_max = engine.normalize(Category::Traction, "arr", 100.0);
        assert!((at_max - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_scale_degenerate_reference() {
        let engine = NormalizationEngine::new(NormalizationMethod::LogScale).with_reference(
            Category::Traction,
            "zero_max",
            ReferenceStats::new(0.0, 0.0, 0.0, 0.0),
        );
        assert_eq!(engine.normalize(Category::Traction, "zero_max", 3.0), 50.0);
    }

    #[test]
    fn test_unknown_metric_clips_raw_value() {
        let engine = engine(NormalizationMethod::MinMax);
        assert_eq!(engine.normalize(Category::Risk, "unknown", 140.0), 100.0);
        assert_eq!(engine.normalize(Category::Risk, "unknown", 73.5), 73.5);
        assert_eq!(engine.normalize(Category::Risk, "unknown", -3.0), 0.0);
    }

    #[test]
    fn test_deterministic_repeat_calls() {
        let engine = engine(NormalizationMethod::ZScore);
        let a = engine.normalize(Category::Traction, "customers", 777.0);
        let b = engine.normalize(Category::Traction, "customers", 777.0);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
