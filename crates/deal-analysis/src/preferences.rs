//! Investor preferences
//!
//! Callers may reweight categories, set a hard minimum score, and state a
//! risk tolerance. Weights are never assumed pre-normalized: whatever the
//! caller supplies is rescaled to sum to 1 before use.

use deal_core::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much risk exposure the investor accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Multiplier applied to the Risk category weight before renormalization
    ///
    /// Conservative investors lean harder on the risk assessment; aggressive
    /// ones discount it. Moderate leaves the canonical weight untouched.
    fn risk_weight_factor(self) -> f64 {
        match self {
            RiskTolerance::Conservative => 1.5,
            RiskTolerance::Moderate => 1.0,
            RiskTolerance::Aggressive => 0.5,
        }
    }
}

/// Caller-supplied analysis preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorPreferences {
    /// Category weight overrides; normalized before use
    pub weights: BTreeMap<Category, f64>,

    /// Force a Pass recommendation below this overall score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_overall_score: Option<f64>,

    pub risk_tolerance: RiskTolerance,
}

impl Default for InvestorPreferences {
    fn default() -> Self {
        Self {
            weights: Category::ALL
                .iter()
                .map(|c| (*c, c.canonical_weight()))
                .collect(),
            min_overall_score: None,
            risk_tolerance: RiskTolerance::Moderate,
        }
    }
}

impl InvestorPreferences {
    /// Weight map after risk-tolerance scaling, normalized to sum to 1
    ///
    /// Categories the caller left out of the map simply carry no weight;
    /// partial-coverage handling downstream treats them like absent scores.
    pub fn effective_weights(&self) -> BTreeMap<Category, f64> {
        let mut weights = self.weights.clone();
        if let Some(risk_weight) = weights.get_mut(&Category::Risk) {
            *risk_weight *= self.risk_tolerance.risk_weight_factor();
        }

        let total: f64 = weights.values().sum();
        if total <= 0.0 {
            return Category::ALL
                .iter()
                .map(|c| (*c, c.canonical_weight()))
                .collect();
        }

        weights.values_mut().for_each(|w| *w /= total);
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_canonical() {
        let prefs = InvestorPreferences::default();
        let weights = prefs.effective_weights();
        assert_eq!(weights[&Category::Founder], 0.25);
        assert_eq!(weights[&Category::Traction], 0.20);
        let total: f64 = weights.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unnormalized_weights_are_rescaled() {
        let prefs = InvestorPreferences {
            weights: [(Category::Founder, 2.0), (Category::Market, 2.0)]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let weights = prefs.effective_weights();
        assert!((weights[&Category::Founder] - 0.5).abs() < 1e-12);
        assert!((weights[&Category::Market] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_conservative_tolerance_boosts_risk_weight() {
        let moderate = InvestorPreferences::default().effective_weights();
        let conservative = InvestorPreferences {
            risk_tolerance: RiskTolerance::Conservative,
            ..Default::default()
        }
        .effective_weights();

        assert!(conservative[&Category::Risk] > moderate[&Category::Risk]);
        let total: f64 = conservative.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_canonical() {
        let prefs = InvestorPreferences {
            weights: [(Category::Founder, 0.0)].into_iter().collect(),
            ..Default::default()
        };
        let weights = prefs.effective_weights();
        assert_eq!(weights.len(), 5);
        assert_eq!(weights[&Category::Founder], 0.25);
    }
}
