//! Metric extraction from pitch text
//!
//! Rules are an ordered list of (metric name, pattern). Only the first
//! numeric match per metric counts, and a metric that does not match or
//! does not parse is omitted entirely: defaulting absent metrics to zero is
//! a caller decision, never the extractor's.

use crate::error::Result;
use deal_core::Category;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named numeric value found in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetric {
    pub name: String,
    pub value: f64,
    pub category: Category,
}

/// Ordered pattern rules for one category's metrics
pub struct MetricExtractor {
    category: Category,
    rules: Vec<(String, Regex)>,
}

impl MetricExtractor {
    /// Compile an ordered rule set; patterns are matched case-insensitively
    pub fn new(category: Category, rules: &[(&str, &str)]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(name, pattern)| {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok(((*name).to_string(), regex))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { category, rules })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Extract the first numeric match per metric, in rule order
    pub fn extract(&self, text: &str) -> Vec<ExtractedMetric> {
        self.rules
            .iter()
            .filter_map(|(name, regex)| {
                let captures = regex.captures(text)?;
                let matched = captures
                    .get(1)
                    .or_else(|| captures.get(0))
                    .map(|m| m.as_str())?;
                parse_numeric(matched).map(|value| ExtractedMetric {
                    name: name.clone(),
                    value,
                    category: self.category,
                })
            })
            .collect()
    }

    /// Extracted metrics as a name -> value map
    pub fn extract_map(&self, text: &str) -> BTreeMap<String, f64> {
        self.extract(text)
            .into_iter()
            .map(|metric| (metric.name, metric.value))
            .collect()
    }
}

/// Strip everything except digits and dots, then parse
///
/// Thousands separators ("1,200") collapse cleanly; text with stray extra
/// dots fails the parse and the metric is dropped.
fn parse_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traction_extractor() -> MetricExtractor {
        MetricExtractor::new(
            Category::Traction,
            &[
                ("arr", r"ARR.*?[\$]?(\d+(?:\.\d+)?)\s*(?:million|thousand|M|K)?"),
                ("customers", r"(?:customers?|users?).*?(\d+(?:,\d+)*)"),
                ("retention", r"retention.*?(\d+(?:\.\d+)?)%"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let extractor = traction_extractor();
        let metrics = extractor.extract_map("ARR of $2M this year, up from ARR of $1M");
        assert_eq!(metrics["arr"], 2.0);
    }

    #[test]
    fn test_absent_metrics_are_omitted() {
        let extractor = traction_extractor();
        let metrics = extractor.extract_map("We have 500 customers.");
        assert_eq!(metrics.get("customers"), Some(&500.0));
        assert!(!metrics.contains_key("arr"));
        assert!(!metrics.contains_key("retention"));
    }

    #[test]
    fn test_thousands_separators_are_stripped() {
        let extractor = traction_extractor();
        let metrics = extractor.extract_map("serving 12,500 users worldwide");
        assert_eq!(metrics["customers"], 12500.0);
    }

    #[test]
    fn test_case_insensitive_match() {
        let extractor = traction_extractor();
        let metrics = extractor.extract_map("arr reached $3.5 million");
        assert_eq!(metrics["arr"], 3.5);
    }

    #[test]
    fn test_extract_preserves_rule_order_and_category() {
        let extractor = traction_extractor();
        let metrics = extractor.extract("retention at 92% with 800 customers and ARR $1M");
        let names: Vec<&str> = metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["arr", "customers", "retention"]);
        assert!(metrics.iter().all(|m| m.category == Category::Traction));
    }

    #[test]
    fn test_unparsable_match_is_dropped() {
        assert_eq!(parse_numeric("1.2.3"), None);
        assert_eq!(parse_numeric("no digits"), None);
        assert_eq!(parse_numeric("$4,000"), Some(4000.0));
    }
}
