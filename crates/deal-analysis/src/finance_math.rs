//! Unit economics and burn/runway math
//!
//! Derivations over whatever subset of metrics the extractor found. Every
//! output is optional: a ratio whose inputs are missing simply is not
//! computed. Revenue figures are in millions (matching the extractor's
//! captured magnitudes); per-customer figures come out in dollars.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived per-customer economics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    /// Annualized revenue (millions), derived from MRR when ARR is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arpu_annual: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arpu_monthly: Option<f64>,
    /// LTV estimated from ARPU, gross margin, and churn when not stated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_ltv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltv_cac_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payback_months: Option<f64>,
}

/// Compute unit economics from extracted metrics
pub fn unit_economics(metrics: &BTreeMap<String, f64>) -> UnitEconomics {
    let get = |key: &str| metrics.get(key).copied().filter(|v| *v > 0.0);

    let stated_arr = get("arr");
    let mrr = get("mrr");
    let customers = get("customers");
    let cac = get("cac");
    let stated_ltv = get("ltv");
    let churn = get("churn");
    let gross_margin = get("gross_margin");

    let mut economics = UnitEconomics {
        arr: stated_arr.or_else(|| mrr.map(|m| m * 12.0)),
        ..UnitEconomics::default()
    };

    if let (Some(arr), Some(customers)) = (economics.arr, customers) {
        let arpu_annual = arr * 1_000_000.0 / customers;
        economics.arpu_annual = Some(arpu_annual);
        economics.arpu_monthly = Some(arpu_annual / 12.0);
    }

    if stated_ltv.is_none() {
        if let (Some(arpu_monthly), Some(churn), Some(margin)) =
            (economics.arpu_monthly, churn, gross_margin)
        {
            let monthly_churn = churn / 100.0;
            if monthly_churn > 0.0 && monthly_churn < 1.0 {
                economics.estimated_ltv =
                    Some(arpu_monthly * (margin / 100.0) / monthly_churn);
            }
        }
    }

    let ltv = stated_ltv.or(economics.estimated_ltv);
    if let (Some(ltv), Some(cac)) = (ltv, cac) {
        economics.ltv_cac_ratio = Some(ltv / cac);
    }

    if let (Some(cac), Some(arpu_monthly), Some(margin)) =
        (cac, economics.arpu_monthly, gross_margin)
    {
        let monthly_gross = arpu_monthly * margin / 100.0;
        if monthly_gross > 0.0 {
            economics.payback_months = Some(cac / monthly_gross);
        }
    }

    economics
}

/// Qualitative runway banding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunwayHealth {
    Excellent,
    Good,
    Adequate,
    Concerning,
    Critical,
}

impl RunwayHealth {
    /// Band runway months: 24+/18+/12+/6+/below
    pub fn from_months(months: f64) -> Self {
        if months >= 24.0 {
            RunwayHealth::Excellent
        } else if months >= 18.0 {
            RunwayHealth::Good
        } else if months >= 12.0 {
            RunwayHealth::Adequate
        } else if months >= 6.0 {
            RunwayHealth::Concerning
        } else {
            RunwayHealth::Critical
        }
    }
}

/// Derived burn and runway figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurnRunway {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway_months: Option<f64>,
    /// Burn divided by revenue; below 1 means revenue covers the burn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burn_multiple: Option<f64>,
    /// Months of burn the raised capital covers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway_health: Option<RunwayHealth>,
}

/// Compute burn/runway figures from extracted metrics
pub fn burn_runway(metrics: &BTreeMap<String, f64>) -> BurnRunway {
    let get = |key: &str| metrics.get(key).copied().filter(|v| *v > 0.0);

    let runway = get("runway");
    let burn = get("burn_rate");
    let revenue = get("revenue").or_else(|| get("mrr"));
    let funding = get("funding_raised");

    BurnRunway {
        runway_months: runway,
        burn_multiple: match (burn, revenue) {
            (Some(burn), Some(revenue)) => Some(burn / revenue),
            _ => None,
        },
        funding_efficiency: match (funding, burn) {
            (Some(funding), Some(burn)) => Some(funding / burn),
            _ => None,
        },
        runway_health: runway.map(RunwayHealth::from_months),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_arr_derived_from_mrr() {
        let economics = unit_economics(&metrics(&[("mrr", 0.1)]));
        assert_eq!(economics.arr, Some(1.2000000000000002));
    }

    #[test]
    fn test_arpu_in_dollars() {
        let economics = unit_economics(&metrics(&[("arr", 2.0), ("customers", 500.0)]));
        assert_eq!(economics.arpu_annual, Some(4000.0));
        assert!((economics.arpu_monthly.unwrap() - 333.3333333333333).abs() < 1e-9);
    }

    #[test]
    fn test_ltv_estimated_from_churn_and_margin() {
        let economics = unit_economics(&metrics(&[
            ("arr", 1.2),
            ("customers", 1000.0),
            ("churn", 2.0),
            ("gross_margin", 80.0),
        ]));
        // arpu_monthly = 100, ltv = 100 * 0.8 / 0.02 = 4000
        assert!((economics.estimated_ltv.unwrap() - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_stated_ltv_wins_over_estimate() {
        let economics = unit_economics(&metrics(&[("ltv", 9000.0), ("cac", 1500.0)]));
        assert!((economics.ltv_cac_ratio.unwrap() - 6.0).abs() < 1e-12);
        assert!(economics.estimated_ltv.is_none());
    }

    #[test]
    fn test_missing_inputs_produce_nothing() {
        let economics = unit_economics(&metrics(&[("customers", 500.0)]));
        assert_eq!(economics, UnitEconomics::default());
    }

    #[test]
    fn test_runway_health_bands() {
        assert_eq!(RunwayHealth::from_months(36.0), RunwayHealth::Excellent);
        assert_eq!(RunwayHealth::from_months(24.0), RunwayHealth::Excellent);
        assert_eq!(RunwayHealth::from_months(18.0), RunwayHealth::Good);
        assert_eq!(RunwayHealth::from_months(12.0), RunwayHealth::Adequate);
        assert_eq!(RunwayHealth::from_months(6.0), RunwayHealth::Concerning);
        assert_eq!(RunwayHealth::from_months(3.0), RunwayHealth::Critical);
    }

    #[test]
    fn test_funding_efficiency() {
        let figures = burn_runway(&metrics(&[
            ("funding_raised", 5.0),
            ("burn_rate", 0.25),
            ("runway", 20.0),
        ]));
        assert_eq!(figures.funding_efficiency, Some(20.0));
        assert_eq!(figures.runway_health, Some(RunwayHealth::Good));
    }
}
