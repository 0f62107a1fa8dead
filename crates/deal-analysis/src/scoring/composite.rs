//! Weighted composite aggregation
//!
//! Aggregates whatever category scores are present. Weights renormalize
//! over the present categories so a missing analysis shrinks coverage
//! instead of dragging the composite toward zero; confidence prices in
//! both how much weight mass was observed and how much the observed
//! scores agree.

use deal_core::Category;
use deal_utils::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of one composite aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    /// Weighted mean over present categories, in [0, 100]
    pub composite_score: f64,
    /// Combined consistency/coverage confidence, in [0, 1]
    pub confidence: f64,
    /// Fraction of canonical weight mass backed by present scores
    pub coverage: f64,
    /// Renormalized weights actually applied, per present category
    pub weights_used: BTreeMap<Category, f64>,
    /// Categories whose score sits more than the threshold sigmas out
    pub outliers: BTreeMap<Category, bool>,
}

/// Human-readable scoring breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreExplanation {
    pub lines: Vec<String>,
    pub methodology: String,
}

/// Aggregates category scores into one weighted composite
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    weights: BTreeMap<Category, f64>,
    consistency_sigma: f64,
    outlier_threshold: f64,
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeScorer {
    /// Scorer with canonical weights
    pub fn new() -> Self {
        let weights = Category::ALL
            .iter()
            .map(|c| (*c, c.canonical_weight()))
            .collect();
        Self {
            weights,
            consistency_sigma: 40.0,
            outlier_threshold: 2.0,
        }
    }

    /// Scorer with caller weights, rescaled to sum to 1
    ///
    /// Degenerate weights (empty or non-positive sum) fall back to the
    /// canonical set.
    pub fn with_weights(weights: BTreeMap<Category, f64>) -> Self {
        let total: f64 = weights.values().sum();
        if total <= 0.0 {
            return Self::new();
        }
        let weights = weights.into_iter().map(|(c, w)| (c, w / total)).collect();
        Self {
            weights,
            ..Self::new()
        }
    }

    /// Override the consistency normalizer (score stdev that zeroes it)
    pub fn with_consistency_sigma(mut self, sigma: f64) -> Self {
        self.consistency_sigma = sigma;
        self
    }

    /// Override the outlier z threshold
    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    /// Aggregate the present category scores
    pub fn score(&self, scores: &BTreeMap<Category, f64>) -> CompositeScore {
        let present: Vec<(Category, f64, f64)> = self
            .weights
            .iter()
            .filter_map(|(category, weight)| {
                scores.get(category).map(|score| (*category, *score, *weight))
            })
            .collect();

        let coverage: f64 = present.iter().map(|(_, _, w)| w).sum();

        if present.is_empty() || coverage <= 0.0 {
            return CompositeScore {
                composite_score: 50.0,
                confidence: 0.1,
                coverage: 0.0,
                weights_used: BTreeMap::new(),
                outliers: self.detect_outliers(scores),
            };
        }

        let weighted_sum: f64 = present.iter().map(|(_, score, w)| score * w).sum();
        let composite_score = (weighted_sum / coverage).clamp(0.0, 100.0);

        let present_scores: Vec<f64> = present.iter().map(|(_, score, _)| *score).collect();
        let consistency =
            (1.0 - stats::sample_stdev(&present_scores) / self.consistency_sigma).clamp(0.0, 1.0);
        let confidence = (0.4 * consistency + 0.6 * coverage).clamp(0.0, 1.0);

        let weights_used = present
            .iter()
            .map(|(category, _, weight)| (*category, weight / coverage))
            .collect();

        CompositeScore {
            composite_score,
            confidence,
            coverage,
            weights_used,
            outliers: self.detect_outliers(scores),
        }
    }

    /// Flag categories whose score deviates beyond the z threshold
    ///
    /// Needs at least three present scores; with fewer, nothing is flagged.
    pub fn detect_outliers(&self, scores: &BTreeMap<Category, f64>) -> BTreeMap<Category, bool> {
        let values: Vec<f64> = scores.values().copied().collect();
        if values.len() < 3 {
            return scores.keys().map(|c| (*c, false)).collect();
        }

        let mean = stats::mean(&values);
        let stdev = stats::sample_stdev(&values);

        scores
            .iter()
            .map(|(category, score)| {
                let flagged =
                    stdev > 0.0 && ((score - mean).abs() / stdev) > self.outlier_threshold;
                (*category, flagged)
            })
            .collect()
    }

    /// Per-category contribution breakdown for the final report
    pub fn explain(&self, scores: &BTreeMap<Category, f64>) -> ScoreExplanation {
        let composite = self.score(scores);
        let mut lines = vec![format!(
            "Overall score of {:.1} calculated as a weighted average over {} categories \
             ({:.0}% weight coverage)",
            composite.composite_score,
            composite.weights_used.len(),
            composite.coverage * 100.0
        )];

        for (category, weight) in &composite.weights_used {
            if let Some(score) = scores.get(category) {
                lines.push(format!(
                    "{}: {score:.1} (weight {:.1}%) contributes {:.1} points",
                    category.title(),
                    weight * 100.0,
                    score * weight
                ));
            }
        }

        let flagged: Vec<&str> = composite
            .outliers
            .iter()
            .filter(|(_, is_outlier)| **is_outlier)
            .map(|(category, _)| category.title())
            .collect();
        if !flagged.is_empty() {
            lines.push(format!("Outlier scores detected in: {}", flagged.join(", ")));
        }

        lines.push(format!(
            "Analysis confidence: {:.2} (0.4 x score consistency + 0.6 x category coverage)",
            composite.confidence
        ));

        ScoreExplanation {
            lines,
            methodology: format!(
                "weighted mean over present categories; outliers at |z| > {:.1}; \
                 consistency normalized by sigma = {:.0}",
                self.outlier_threshold, self.consistency_sigma
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(Category, f64)]) -> BTreeMap<Category, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_full_coverage_weighted_mean() {
        let scorer = CompositeScorer::new();
        let composite = scorer.score(&scores(&[
            (Category::Founder, 80.0),
            (Category::Market, 80.0),
            (Category::Traction, 80.0),
            (Category::Finance, 80.0),
            (Category::Risk, 80.0),
        ]));
        assert!((composite.composite_score - 80.0).abs() < 1e-12);
        assert!((composite.coverage - 1.0).abs() < 1e-12);
        // Identical scores: full consistency, full coverage
        assert!((composite.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_present_category_equals_its_score() {
        let scorer = CompositeScorer::with_weights(scores(&[
            (Category::Founder, 0.5),
            (Category::Market, 0.5),
        ]));
        let composite = scorer.score(&scores(&[(Category::Founder, 73.0)]));
        assert_eq!(composite.composite_score, 73.0);
        assert!((composite.coverage - 0.5).abs() < 1e-12);
        assert_eq!(composite.weights_used[&Category::Founder], 1.0);
    }

    #[test]
    fn test_unnormalized_weights_are_rescaled() {
        let scorer =
            CompositeScorer::with_weights(scores(&[(Category::Founder, 2.0), (Category::Risk, 2.0)]));
        let composite = scorer.score(&scores(&[
            (Category::Founder, 60.0),
            (Category::Risk, 80.0),
        ]));
        assert!((composite.composite_score - 70.0).abs() < 1e-12);
        assert!((composite.coverage - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_scores_yield_uninformative_default() {
        let scorer = CompositeScorer::new();
        let composite = scorer.score(&BTreeMap::new());
        assert_eq!(composite.composite_score, 50.0);
        assert_eq!(composite.confidence, 0.1);
        assert_eq!(composite.coverage, 0.0);
        assert!(composite.weights_used.is_empty());
    }

    #[test]
    fn test_outlier_flagging() {
        let scorer = CompositeScorer::new().with_outlier_threshold(1.5);
        let outliers = scorer.detect_outliers(&scores(&[
            (Category::Founder, 70.0),
            (Category::Market, 72.0),
            (Category::Traction, 71.0),
            (Category::Finance, 69.0),
            (Category::Risk, 20.0),
        ]));
        assert!(outliers[&Category::Risk]);
        assert!(!outliers[&Category::Founder]);
    }

    #[test]
    fn test_no_outliers_with_two_scores() {
        let scorer = CompositeScorer::new();
        let outliers =
            scorer.detect_outliers(&scores(&[(Category::Founder, 10.0), (Category::Risk, 95.0)]));
        assert!(outliers.values().all(|flagged| !flagged));
    }

    #[test]
    fn test_confidence_penalizes_partial_coverage() {
        let scorer = CompositeScorer::new();
        let full = scorer.score(&scores(&[
            (Category::Founder, 70.0),
            (Category::Market, 70.0),
            (Category::Traction, 70.0),
            (Category::Finance, 70.0),
            (Category::Risk, 70.0),
        ]));
        let partial = scorer.score(&scores(&[(Category::Founder, 70.0)]));
        assert!(partial.confidence < full.confidence);
    }

    #[test]
    fn test_determinism() {
        let scorer = CompositeScorer::new();
        let input = scores(&[
            (Category::Founder, 67.3),
            (Category::Market, 81.9),
            (Category::Traction, 55.5),
        ]);
        let a = scorer.score(&input);
        let b = scorer.score(&input);
        assert_eq!(a.composite_score.to_bits(), b.composite_score.to_bits());
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
    }

    #[test]
    fn test_explanation_lists_contributions() {
        let scorer = CompositeScorer::new();
        let explanation = scorer.explain(&scores(&[
            (Category::Founder, 80.0),
            (Category::Market, 60.0),
        ]));
        assert!(explanation.lines.iter().any(|l| l.starts_with("Founder:")));
        assert!(explanation.lines.iter().any(|l| l.starts_with("Market:")));
    }
}
