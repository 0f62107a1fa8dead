//! Score extraction from LLM responses
//!
//! The wire convention is free text ending in `Score: <int>`, but models
//! drift: an ordered list of parser strategies is tried until one yields a
//! valid integer, and when none does, the last resort is a tunable
//! length/keyword heuristic rather than a silent zero.

use regex::{Regex, RegexBuilder};

/// Result of running the parser chain over one response
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    /// Parsed score clamped to [0, 100]; None when no strategy matched
    pub score: Option<f64>,
    /// Text preceding the matched marker (the whole response if none)
    pub summary: String,
}

/// Last-resort score estimation policy
///
/// Applied when no strategy finds a score marker. A longer, more positive
/// response earns a higher estimate: `base` plus up to `length_bonus_cap`
/// for length (saturating at `length_saturation_chars`) plus
/// `keyword_bonus` per distinct positive keyword present, capped at
/// `keyword_bonus_cap`.
#[derive(Debug, Clone)]
pub struct HeuristicScorePolicy {
    pub base: f64,
    pub length_bonus_cap: f64,
    pub length_saturation_chars: usize,
    pub keyword_bonus: f64,
    pub keyword_bonus_cap: f64,
    pub positive_keywords: Vec<&'static str>,
}

impl Default for HeuristicScorePolicy {
    fn default() -> Self {
        Self {
            base: 35.0,
            length_bonus_cap: 20.0,
            length_saturation_chars: 1200,
            keyword_bonus: 4.0,
            keyword_bonus_cap: 30.0,
            positive_keywords: vec![
                "strong",
                "growth",
                "promising",
                "experienced",
                "profitable",
                "traction",
                "opportunity",
                "innovative",
                "scalable",
                "proven",
            ],
        }
    }
}

impl HeuristicScorePolicy {
    /// Estimate a score from response length and positive-keyword density
    pub fn estimate(&self, response: &str) -> f64 {
        let length_ratio =
            (response.len() as f64 / self.length_saturation_chars as f64).min(1.0);
        let length_bonus = length_ratio * self.length_bonus_cap;

        let lower = response.to_lowercase();
        let hits = self
            .positive_keywords
            .iter()
            .filter(|keyword| lower.contains(*keyword))
            .count();
        let keyword_bonus = (hits as f64 * self.keyword_bonus).min(self.keyword_bonus_cap);

        (self.base + length_bonus + keyword_bonus).clamp(0.0, 100.0)
    }
}

/// Ordered score parser with a heuristic last resort
pub struct ScoreParser {
    strategies: Vec<Regex>,
    heuristic: HeuristicScorePolicy,
}

impl ScoreParser {
    /// Strategies in priority order: Score:, Rating:, N/100, N%
    pub fn new(heuristic: HeuristicScorePolicy) -> crate::error::Result<Self> {
        let patterns = [
            r"Score:\s*(\d+)",
            r"Rating:\s*(\d+)",
            r"(\d+)\s*/\s*100",
            r"(\d+)%",
        ];
        let strategies = patterns
            .iter()
            .map(|p| {
                Ok(RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()?)
            })
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(Self {
            strategies,
            heuristic,
        })
    }

    /// Run the strategy chain; `score` is None if no marker was found
    pub fn parse(&self, response: &str) -> ParsedResponse {
        for strategy in &self.strategies {
            if let Some(captures) = strategy.captures(response) {
                let matched = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                if let Ok(value) = matched.parse::<f64>() {
                    let marker_start = captures
                        .get(0)
                        .map(|m| m.start())
                        .unwrap_or(response.len());
                    return ParsedResponse {
                        score: Some(value.clamp(0.0, 100.0)),
                        summary: response[..marker_start].trim().to_string(),
                    };
                }
            }
        }

        ParsedResponse {
            score: None,
            summary: response.trim().to_string(),
        }
    }

    /// Parse, falling back to the heuristic estimate
    ///
    /// The bool is true when the score was estimated rather than parsed.
    pub fn parse_or_estimate(&self, response: &str) -> (f64, String, bool) {
        let parsed = self.parse(response);
        match parsed.score {
            Some(score) => (score, parsed.summary, false),
            None => (self.heuristic.estimate(response), parsed.summary, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_marker_has_priority() {
        let parser = ScoreParser::new(HeuristicScorePolicy::default()).unwrap();
        let parsed = parser.parse("Rated 90/100 overall. Score: 72");
        assert_eq!(parsed.score, Some(72.0));
        assert_eq!(parsed.summary, "Rated 90/100 overall.");
    }

    #[test]
    fn test_strategy_chain_order() {
        let parser = ScoreParser::new(HeuristicScorePolicy::default()).unwrap();
        assert_eq!(parser.parse("Rating: 65").score, Some(65.0));
        assert_eq!(parser.parse("I give it 58/100").score, Some(58.0));
        assert_eq!(parser.parse("confidence of 70%").score, Some(70.0));
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let parser = ScoreParser::new(HeuristicScorePolicy::default()).unwrap();
        assert_eq!(parser.parse("Score: 250").score, Some(100.0));
    }

    #[test]
    fn test_case_insensitive_marker() {
        let parser = ScoreParser::new(HeuristicScorePolicy::default()).unwrap();
        assert_eq!(parser.parse("Solid team.\nscore: 81").score, Some(81.0));
    }

    #[test]
    fn test_no_marker_keeps_whole_summary() {
        let parser = ScoreParser::new(HeuristicScorePolicy::default()).unwrap();
        let parsed = parser.parse("A thorough narrative without any verdict.");
        assert_eq!(parsed.score, None);
        assert_eq!(parsed.summary, "A thorough narrative without any verdict.");
    }

    #[test]
    fn test_heuristic_estimate_rises_with_positivity() {
        let policy = HeuristicScorePolicy::default();
        let flat = policy.estimate("short note");
        let positive = policy.estimate(
            "Strong growth, proven traction, experienced team, and a scalable, \
             profitable model with a promising opportunity ahead.",
        );
        assert!(positive > flat);
        assert!(flat >= policy.base);
    }

    #[test]
    fn test_parse_or_estimate_flags_estimates() {
        let parser = ScoreParser::new(HeuristicScorePolicy::default()).unwrap();
        let (_, _, estimated) = parser.parse_or_estimate("no verdict at all");
        assert!(estimated);
        let (score, _, estimated) = parser.parse_or_estimate("Score: 44");
        assert!(!estimated);
        assert_eq!(score, 44.0);
    }
}
