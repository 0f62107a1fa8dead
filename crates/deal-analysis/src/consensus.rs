//! Multi-call consensus over LLM judgments
//!
//! One category question is asked N times at different sampling
//! temperatures; the answers are reduced to a single robust
//! (score, text, confidence) triple. The median beats the mean here: one
//! hallucinated extreme moves a three-member mean by a third of its error,
//! the median not at all. Invocations run concurrently and are awaited as a
//! batch; a failing member is excluded from the pool rather than aborting
//! it.

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fallback;
use crate::score_parse::{HeuristicScorePolicy, ScoreParser};
use deal_core::Category;
use deal_llm::{InferenceProvider, InferenceRequest};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One ensemble member's parsed answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub temperature: f32,
    /// Parsed score; None when no strategy matched the response
    pub score: Option<f64>,
    pub summary: String,
    /// Full raw response text
    pub raw: String,
}

/// The reduced judgment for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consensus {
    /// Consensus score in [0, 100]
    pub score: f64,
    /// Representative narrative text (response prefix before the marker)
    pub text: String,
    /// Full response the representative text came from
    pub detail: String,
    /// Agreement-based confidence in [0, 1]
    pub confidence: f64,
    /// Members whose response yielded a valid (> 0) score
    pub valid_predictions: usize,
    /// Members that returned any response at all
    pub responses: usize,
    /// True when the score was estimated by the length/keyword heuristic
    pub estimated: bool,
    /// True when every invocation failed and fixed content was substituted
    pub is_fallback: bool,
}

/// Issues tempered samples and reduces them to a [`Consensus`]
pub struct EnsembleJudge {
    provider: Arc<dyn InferenceProvider>,
    parser: ScoreParser,
    temperatures: Vec<f32>,
    timeout: Duration,
    max_tokens: usize,
    sigma_max: f64,
}

impl EnsembleJudge {
    pub fn new(provider: Arc<dyn InferenceProvider>, config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            provider,
            parser: ScoreParser::new(HeuristicScorePolicy::default())?,
            temperatures: config.ensemble_temperatures.clone(),
            timeout: config.invocation_timeout,
            max_tokens: config.max_tokens,
            sigma_max: config.consensus_sigma_max,
        })
    }

    /// Ask the ensemble and reduce the answers
    ///
    /// Never returns an error: a completely dead ensemble degrades to the
    /// category's fixed fallback triple with `is_fallback` set.
    pub async fn judge(&self, category: Category, prompt: &str) -> Consensus {
        let calls = self.temperatures.iter().map(|&temperature| {
            let request = InferenceRequest::builder(prompt)
                .temperature(temperature)
                .max_tokens(self.max_tokens)
                .build();
            async move {
                match tokio::time::timeout(self.timeout, self.provider.invoke(request)).await {
                    Ok(Ok(response)) => Some((temperature, response.content)),
                    Ok(Err(error)) => {
                        warn!(%category, temperature, %error, "ensemble member failed");
                        None
                    }
                    Err(_) => {
                        warn!(%category, temperature, timeout = ?self.timeout, "ensemble member timed out");
                        None
                    }
                }
            }
        });

        let responses: Vec<(f32, String)> =
            join_all(calls).await.into_iter().flatten().collect();

        if responses.is_empty() {
            let (score, text) = fallback::consensus_fallback(category);
            warn!(%category, "all ensemble invocations failed, using fallback consensus");
            return Consensus {
                score,
                text: text.to_string(),
                detail: text.to_string(),
                confidence: 0.2,
                valid_predictions: 0,
                responses: 0,
                estimated: false,
                is_fallback: true,
            };
        }

        let predictions: Vec<Prediction> = responses
            .iter()
            .map(|(temperature, content)| {
                let parsed = self.parser.parse(content);
                Prediction {
                    temperature: *temperature,
                    score: parsed.score,
                    summary: parsed.summary,
                    raw: content.clone(),
                }
            })
            .collect();

        self.reduce(category, &responses, predictions)
    }

    fn reduce(
        &self,
        category: Category,
        responses: &[(f32, String)],
        predictions: Vec<Prediction>,
    ) -> Consensus {
        let valid: Vec<&Prediction> = predictions
            .iter()
            .filter(|p| p.score.is_some_and(|s| s > 0.0))
            .collect();

        debug!(
            %category,
            responses = responses.len(),
            valid = valid.len(),
            "reducing ensemble predictions"
        );

        match valid.len() {
            0 => {
                // No member produced a usable marker: estimate from the
                // first response instead of defaulting to zero.
                let (score, summary, _) = self.parser.parse_or_estimate(&responses[0].1);
                Consensus {
                    score,
                    text: summary,
                    detail: responses[0].1.clone(),
                    confidence: 0.3,
                    valid_predictions: 0,
                    responses: responses.len(),
                    estimated: true,
                    is_fallback: false,
                }
            }
            1 => Consensus {
                score: valid[0].score.unwrap_or_default(),
                text: valid[0].summary.clone(),
                detail: valid[0].raw.clone(),
                confidence: 0.5,
                valid_predictions: 1,
                responses: responses.len(),
                estimated: false,
                is_fallback: false,
            },
            _ => {
                let scores: Vec<f64> = valid.iter().filter_map(|p| p.score).collect();
                let consensus_score = deal_utils::stats::median(&scores).trunc();
                let stdev = deal_utils::stats::sample_stdev(&scores);
                let confidence = (1.0 - stdev / self.sigma_max).clamp(0.1, 1.0);

                // First prediction closest to the median represents the pool
                let representative = valid.iter().min_by(|a, b| {
                    let da = (a.score.unwrap_or_default() - consensus_score).abs();
                    let db = (b.score.unwrap_or_default() - consensus_score).abs();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                });

                Consensus {
                    score: consensus_score,
                    text: representative.map(|p| p.summary.clone()).unwrap_or_default(),
                    detail: representative.map(|p| p.raw.clone()).unwrap_or_default(),
                    confidence,
                    valid_predictions: valid.len(),
                    responses: responses.len(),
                    estimated: false,
                    is_fallback: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deal_llm::{InferenceResponse, LLMError};
    use std::sync::Mutex;

    /// Provider that pops scripted responses in invocation order
    struct ScriptedProvider {
        responses: Mutex<Vec<deal_llm::Result<String>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<deal_llm::Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl InferenceProvider for ScriptedProvider {
        async fn invoke(&self, _request: InferenceRequest) -> deal_llm::Result<InferenceResponse> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LLMError::RequestFailed("script exhausted".to_string()));
            }
            responses
                .remove(0)
                .map(|content| InferenceResponse { content })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn judge_with(responses: Vec<deal_llm::Result<String>>) -> EnsembleJudge {
        let config = AnalysisConfig::default();
        EnsembleJudge::new(Arc::new(ScriptedProvider::new(responses)), &config).unwrap()
    }

    #[tokio::test]
    async fn test_median_resists_outlier() {
        let judge = judge_with(vec![
            Ok("Looks solid. Score: 70".to_string()),
            Ok("Looks solid. Score: 72".to_string()),
            Ok("Stellar! Score: 95".to_string()),
        ]);
        let consensus = judge.judge(Category::Market, "rate it").await;
        assert_eq!(consensus.score, 72.0);
        assert_eq!(consensus.valid_predictions, 3);
        assert!(!consensus.is_fallback);
    }

    #[tokio::test]
    async fn test_perfect_agreement_yields_full_confidence() {
        let judge = judge_with(vec![
            Ok("Score: 80".to_string()),
            Ok("Score: 80".to_string()),
            Ok("Score: 80".to_string()),
        ]);
        let consensus = judge.judge(Category::Founder, "rate it").await;
        assert_eq!(consensus.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_single_valid_prediction_confidence() {
        let judge = judge_with(vec![
            Ok("Score: 66".to_string()),
            Err(LLMError::RequestFailed("boom".to_string())),
            Err(LLMError::RequestFailed("boom".to_string())),
        ]);
        let consensus = judge.judge(Category::Traction, "rate it").await;
        assert_eq!(consensus.score, 66.0);
        assert_eq!(consensus.confidence, 0.5);
        assert_eq!(consensus.valid_predictions, 1);
    }

    #[tokio::test]
    async fn test_no_valid_scores_estimates_with_low_confidence() {
        let judge = judge_with(vec![
            Ok("Strong growth and proven traction, but no verdict.".to_string()),
            Ok("A promising opportunity, no number given.".to_string()),
            Err(LLMError::RequestFailed("boom".to_string())),
        ]);
        let consensus = judge.judge(Category::Market, "rate it").await;
        assert_eq!(consensus.confidence, 0.3);
        assert!(consensus.estimated);
        assert!(consensus.score > 0.0);
    }

    #[tokio::test]
    async fn test_all_failed_uses_category_fallback() {
        let judge = judge_with(vec![
            Err(LLMError::RequestFailed("boom".to_string())),
            Err(LLMError::RequestFailed("boom".to_string())),
            Err(LLMError::RequestFailed("boom".to_string())),
        ]);
        let consensus = judge.judge(Category::Finance, "rate it").await;
        assert!(consensus.is_fallback);
        assert_eq!(consensus.confidence, 0.2);
        assert_eq!(consensus.score, 45.0);
    }

    #[tokio::test]
    async fn test_representative_text_tracks_median() {
        let judge = judge_with(vec![
            Ok("Too generous take. Score: 95".to_string()),
            Ok("Balanced take. Score: 71".to_string()),
            Ok("Harsh take. Score: 40".to_string()),
        ]);
        let consensus = judge.judge(Category::Founder, "rate it").await;
        assert_eq!(consensus.score, 71.0);
        assert_eq!(consensus.text, "Balanced take.");
    }
}
