//! Prompt templates for the category agents
//!
//! Every prompt instructs the model to end with a machine-parseable
//! `Score: X` marker; the parsing side tolerates its absence (see
//! `score_parse`).

use deal_core::Category;

const FOUNDER_PROMPT: &str = r"Analyze the founder profile from this startup document. Focus on:
1. Founder experience and background
2. Domain expertise relevance
3. Previous startup experience or exits
4. Team composition and complementarity
5. Leadership indicators";

const MARKET_PROMPT: &str = r"Analyze the market opportunity from this startup document. Focus on:
1. Total Addressable Market (TAM) size and validity
2. Market growth rate and trends
3. Competitive landscape density
4. Market timing and readiness
5. Barriers to entry";

const TRACTION_PROMPT: &str = r"Analyze the traction and business metrics from this startup document. Focus on:
1. Revenue metrics (ARR, MRR, growth)
2. Customer acquisition and growth
3. Retention and churn rates
4. Unit economics indicators
5. Market validation signals";

const FINANCE_PROMPT: &str = r"Analyze the financial metrics and unit economics from this startup document. Focus on:
1. Unit economics (CAC, LTV, payback period)
2. Burn rate and runway
3. Funding efficiency and capital requirements
4. Financial projections credibility
5. Path to profitability";

const RISK_PROMPT: &str = r"Analyze the key risks for this startup. Focus on:
1. Market risks (market size, timing, adoption)
2. Execution risks (team, product development, scaling)
3. Financial risks (funding, burn rate, unit economics)
4. Competitive risks (competition, differentiation)
5. Regulatory/legal risks (compliance, IP, regulations)";

/// Full analysis prompt for a category over a document excerpt
pub fn analysis_prompt(category: Category, document_excerpt: &str) -> String {
    let focus = match category {
        Category::Founder => FOUNDER_PROMPT,
        Category::Market => MARKET_PROMPT,
        Category::Traction => TRACTION_PROMPT,
        Category::Finance => FINANCE_PROMPT,
        Category::Risk => RISK_PROMPT,
    };

    let closing = match category {
        Category::Risk => {
            "Identify specific risks and provide risk mitigation assessment. \
             End with \"Score: X\" (0-100, where higher score = lower risk)."
        }
        _ => "Provide detailed analysis and end with \"Score: X\" (0-100).",
    };

    format!("{focus}\n\nDocument: {document_excerpt}\n\n{closing}")
}

/// Truncate a document to the prompt excerpt budget on a char boundary
pub fn excerpt(document_text: &str, max_chars: usize) -> &str {
    match document_text.char_indices().nth(max_chars) {
        Some((idx, _)) => &document_text[..idx],
        None => document_text,
    }
}

/// Owned char-boundary truncation for summaries
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    excerpt(text, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prompt_requests_score_marker() {
        for category in Category::ALL {
            let prompt = analysis_prompt(category, "doc body");
            assert!(prompt.contains("Score: X"), "{category} prompt lacks marker");
            assert!(prompt.contains("doc body"));
        }
    }

    #[test]
    fn test_risk_prompt_inverts_scale() {
        let prompt = analysis_prompt(Category::Risk, "doc");
        assert!(prompt.contains("higher score = lower risk"));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(excerpt(text, 4), "héll");
        assert_eq!(excerpt(text, 100), text);
    }
}
