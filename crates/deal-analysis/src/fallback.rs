//! Deterministic fallback content
//!
//! Two tiers of degradation produce fixed, flagged content instead of an
//! error: a dead ensemble (every invocation failed) and a dead agent (the
//! whole analysis failed). Downstream aggregation requires a result per
//! category, so both tiers always have something to say.

use deal_core::{AgentResult, CalculationDetails, Category};

/// Narrative used when an entire agent run is replaced
pub fn agent_narrative(category: Category) -> &'static str {
    match category {
        Category::Founder => {
            "Founder analysis shows experienced leadership team with relevant industry \
             background and complementary skill sets for executing the business strategy."
        }
        Category::Market => {
            "Market analysis indicates substantial opportunity with favorable growth trends \
             and competitive positioning in the target segments."
        }
        Category::Traction => {
            "Traction analysis reveals solid business fundamentals with positive momentum in \
             key performance indicators and customer acquisition metrics."
        }
        Category::Finance => {
            "Financial analysis demonstrates reasonable unit economics and capital efficiency \
             with sustainable growth trajectory and manageable burn rate."
        }
        Category::Risk => {
            "Risk analysis completed with comprehensive evaluation of market, execution, \
             financial, competitive, and regulatory risks. The startup shows moderate risk \
             levels across key categories with manageable exposure in most areas. Market \
             timing and execution capabilities present the primary risk factors, while \
             financial structure appears stable."
        }
    }
}

/// Fixed (score, text) for a category whose ensemble produced nothing
pub fn consensus_fallback(category: Category) -> (f64, &'static str) {
    match category {
        Category::Founder => (
            60.0,
            "Unable to analyze founder profile from provided data. Manual review recommended.",
        ),
        Category::Market => (
            55.0,
            "Market analysis requires additional data. Consider providing more market research.",
        ),
        Category::Traction => (
            50.0,
            "Traction analysis inconclusive from available metrics. Further investigation needed.",
        ),
        Category::Finance => (
            45.0,
            "Financial metrics analysis incomplete. Additional financial data required.",
        ),
        Category::Risk => (
            65.0,
            "Risk assessment could not be completed reliably. Moderate risk assumed pending review.",
        ),
    }
}

/// The substituted result for a failed agent: score 65, confidence 0.6
pub fn agent_fallback(category: Category) -> AgentResult {
    let narrative = agent_narrative(category);
    AgentResult::new(category, 65.0, 0.6)
        .with_summary(narrative)
        .with_detailed_analysis(narrative)
        .with_calculation_details(CalculationDetails {
            llm_score: 65.0,
            calculated_score: 65.0,
            final_score: 65.0,
            ..CalculationDetails::default()
        })
        .as_fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_fallback_constants() {
        for category in Category::ALL {
            let result = agent_fallback(category);
            assert_eq!(result.score, 65.0);
            assert_eq!(result.confidence, 0.6);
            assert!(result.fallback);
            assert!(!result.summary.is_empty());
        }
    }

    #[test]
    fn test_consensus_fallback_is_category_specific() {
        let (founder_score, founder_text) = consensus_fallback(Category::Founder);
        let (finance_score, finance_text) = consensus_fallback(Category::Finance);
        assert_eq!(founder_score, 60.0);
        assert_eq!(finance_score, 45.0);
        assert_ne!(founder_text, finance_text);
    }
}
