//! Success probability model
//!
//! A logistic map from composite score to probability, then a confidence
//! adjustment: low-confidence composites are pulled toward an
//! uninformative 0.1 floor instead of being trusted at face value.

use crate::scoring::composite::CompositeScore;
use deal_utils::{Numerics, StdNumerics};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Qualitative probability band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuccessBand {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl SuccessBand {
    /// Band boundaries at 0.2/0.4/0.6/0.8, inclusive upward
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.8 {
            SuccessBand::VeryHigh
        } else if probability >= 0.6 {
            SuccessBand::High
        } else if probability >= 0.4 {
            SuccessBand::Moderate
        } else if probability >= 0.2 {
            SuccessBand::Low
        } else {
            SuccessBand::VeryLow
        }
    }
}

impl fmt::Display for SuccessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SuccessBand::VeryLow => "Very Low",
            SuccessBand::Low => "Low",
            SuccessBand::Moderate => "Moderate",
            SuccessBand::High => "High",
            SuccessBand::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

/// Calibrated success estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessForecast {
    /// Confidence-adjusted probability in [0, 1]
    pub probability: f64,
    pub band: SuccessBand,
    /// Confidence inherited from the composite
    pub confidence: f64,
}

/// Converts a composite score into a success probability
pub struct SuccessProbabilityModel {
    steepness: f64,
    threshold: f64,
    floor: f64,
    numerics: Arc<dyn Numerics>,
}

impl Default for SuccessProbabilityModel {
    fn default() -> Self {
        Self::new(0.1, 60.0)
    }
}

impl SuccessProbabilityModel {
    /// Model with the given logistic steepness and midpoint score
    pub fn new(steepness: f64, threshold: f64) -> Self {
        Self {
            steepness,
            threshold,
            floor: 0.1,
            numerics: Arc::new(StdNumerics),
        }
    }

    /// Swap the numeric backend (construction-time choice)
    pub fn with_numerics(mut self, numerics: Arc<dyn Numerics>) -> Self {
        self.numerics = numerics;
        self
    }

    /// Estimate success from a composite score and its confidence
    pub fn estimate(&self, composite: &CompositeScore) -> SuccessForecast {
        let logit = self.steepness * (composite.composite_score - self.threshold);
        let raw = 1.0 / (1.0 + self.numerics.exp(-logit));

        let confidence = composite.confidence.clamp(0.0, 1.0);
        let probability =
            (raw * confidence + self.floor * (1.0 - confidence)).clamp(0.0, 1.0);

        SuccessForecast {
            probability,
            band: SuccessBand::from_probability(probability),
            confidence,
        }
    }
}
