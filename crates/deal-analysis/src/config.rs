//! Configuration for pitch analysis operations
//!
//! Every hand-tuned constant in the scoring pipeline lives here rather than
//! inline: the LLM/heuristic blend ratio, the disagreement normalizers, the
//! logistic calibration, and the ensemble sampling plan all came from the
//! field without documented calibration, so they stay tunable.

use crate::error::{AnalysisError, Result};
use crate::scoring::NormalizationMethod;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for pitch analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Weight of the LLM judgment in the final blend; the deterministic
    /// heuristic score receives the complement
    pub llm_blend_weight: f64,

    /// Maximum meaningful ensemble disagreement (score stdev) on the
    /// 0-100 scale; disagreement at or above this floors the confidence
    pub consensus_sigma_max: f64,

    /// Sub-score stdev that drives agent confidence to its floor
    pub subscore_sigma_scale: f64,

    /// Present-score stdev that zeroes the composite consistency factor
    pub composite_sigma_scale: f64,

    /// Steepness of the score-to-probability logistic
    pub logistic_steepness: f64,

    /// Composite score at which success probability crosses 0.5
    pub logistic_threshold: f64,

    /// |z| above which a category score is flagged as an outlier
    pub outlier_threshold: f64,

    /// Sampling temperatures for the consensus ensemble; a single entry
    /// disables the ensemble and issues one call
    pub ensemble_temperatures: Vec<f32>,

    /// Time budget for one LLM invocation
    pub invocation_timeout: Duration,

    /// Max tokens requested per LLM invocation
    pub max_tokens: usize,

    /// Document excerpt length (chars) included in prompts
    pub max_prompt_chars: usize,

    /// Normalization method for reference-backed metrics
    pub normalization_method: NormalizationMethod,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            llm_blend_weight: 0.6,
            consensus_sigma_max: 30.0,
            subscore_sigma_scale: 50.0,
            composite_sigma_scale: 40.0,
            logistic_steepness: 0.1,
            logistic_threshold: 60.0,
            outlier_threshold: 2.0,
            ensemble_temperatures: vec![0.1, 0.3, 0.0],
            invocation_timeout: Duration::from_secs(30),
            max_tokens: 1024,
            max_prompt_chars: 2000,
            normalization_method: NormalizationMethod::MinMax,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.llm_blend_weight) {
            return Err(AnalysisError::ConfigError(
                "llm_blend_weight must be within [0, 1]".to_string(),
            ));
        }

        if self.consensus_sigma_max <= 0.0
            || self.subscore_sigma_scale <= 0.0
            || self.composite_sigma_scale <= 0.0
        {
            return Err(AnalysisError::ConfigError(
                "disagreement normalizers must be positive".to_string(),
            ));
        }

        if self.outlier_threshold <= 0.0 {
            return Err(AnalysisError::ConfigError(
                "outlier_threshold must be positive".to_string(),
            ));
        }

        if self.ensemble_temperatures.is_empty() {
            return Err(AnalysisError::ConfigError(
                "at least one sampling temperature is required".to_string(),
            ));
        }

        if self.invocation_timeout.is_zero() {
            return Err(AnalysisError::ConfigError(
                "invocation_timeout must be non-zero".to_string(),
            ));
        }

        if self.max_prompt_chars == 0 {
            return Err(AnalysisError::ConfigError(
                "max_prompt_chars must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Weight of the deterministic heuristic in the final blend
    pub fn heuristic_blend_weight(&self) -> f64 {
        1.0 - self.llm_blend_weight
    }
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    llm_blend_weight: Option<f64>,
    consensus_sigma_max: Option<f64>,
    subscore_sigma_scale: Option<f64>,
    composite_sigma_scale: Option<f64>,
    logistic_steepness: Option<f64>,
    logistic_threshold: Option<f64>,
    outlier_threshold: Option<f64>,
    ensemble_temperatures: Option<Vec<f32>>,
    invocation_timeout: Option<Duration>,
    max_tokens: Option<usize>,
    max_prompt_chars: Option<usize>,
    normalization_method: Option<NormalizationMethod>,
}

impl AnalysisConfigBuilder {
    /// Set the LLM weight of the score blend
    pub fn llm_blend_weight(mut self, weight: f64) -> Self {
        self.llm_blend_weight = Some(weight);
        self
    }

    /// Set the maximum meaningful ensemble disagreement
    pub fn consensus_sigma_max(mut self, sigma: f64) -> Self {
        self.consensus_sigma_max = Some(sigma);
        self
    }

    /// Set the sub-score confidence normalizer
    pub fn subscore_sigma_scale(mut self, sigma: f64) -> Self {
        self.subscore_sigma_scale = Some(sigma);
        self
    }

    /// Set the composite consistency normalizer
    pub fn composite_sigma_scale(mut self, sigma: f64) -> Self {
        self.composite_sigma_scale = Some(sigma);
        self
    }

    /// Set the logistic steepness parameter
    pub fn logistic_steepness(mut self, k: f64) -> Self {
        self.logistic_steepness = Some(k);
        self
    }

    /// Set the logistic midpoint score
    pub fn logistic_threshold(mut self, threshold: f64) -> Self {
        self.logistic_threshold = Some(threshold);
        self
    }

    /// Set the outlier z-score threshold
    pub fn outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = Some(threshold);
        self
    }

    /// Set the ensemble sampling temperatures
    pub fn ensemble_temperatures(mut self, temperatures: Vec<f32>) -> Self {
        self.ensemble_temperatures = Some(temperatures);
        self
    }

    /// Disable the ensemble: one invocation per category
    pub fn single_sample(mut self, temperature: f32) -> Self {
        self.ensemble_temperatures = Some(vec![temperature]);
        self
    }

    /// Set the per-invocation time budget
    pub fn invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = Some(timeout);
        self
    }

    /// Set max tokens per invocation
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the prompt excerpt length
    pub fn max_prompt_chars(mut self, chars: usize) -> Self {
        self.max_prompt_chars = Some(chars);
        self
    }

    /// Set the normalization method
    pub fn normalization_method(mut self, method: NormalizationMethod) -> Self {
        self.normalization_method = Some(method);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let config = AnalysisConfig {
            llm_blend_weight: self.llm_blend_weight.unwrap_or(defaults.llm_blend_weight),
            consensus_sigma_max: self
                .consensus_sigma_max
                .unwrap_or(defaults.consensus_sigma_max),
            subscore_sigma_scale: self
                .subscore_sigma_scale
                .unwrap_or(defaults.subscore_sigma_scale),
            composite_sigma_scale: self
                .composite_sigma_scale
                .unwrap_or(defaults.composite_sigma_scale),
            logistic_steepness: self
                .logistic_steepness
                .unwrap_or(defaults.logistic_steepness),
            logistic_threshold: self
                .logistic_threshold
                .unwrap_or(defaults.logistic_threshold),
            outlier_threshold: self.outlier_threshold.unwrap_or(defaults.outlier_threshold),
            ensemble_temperatures: self
                .ensemble_temperatures
                .unwrap_or(defaults.ensemble_temperatures),
            invocation_timeout: self
                .invocation_timeout
                .unwrap_or(defaults.invocation_timeout),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            max_prompt_chars: self.max_prompt_chars.unwrap_or(defaults.max_prompt_chars),
            normalization_method: self
                .normalization_method
                .unwrap_or(defaults.normalization_method),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.llm_blend_weight, 0.6);
        assert_eq!(config.consensus_sigma_max, 30.0);
        assert_eq!(config.logistic_threshold, 60.0);
        assert_eq!(config.ensemble_temperatures.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AnalysisConfig::builder()
            .llm_blend_weight(0.5)
            .single_sample(0.2)
            .invocation_timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.llm_blend_weight, 0.5);
        assert_eq!(config.heuristic_blend_weight(), 0.5);
        assert_eq!(config.ensemble_temperatures, vec![0.2]);
        assert_eq!(config.invocation_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_validation_rejects_bad_blend() {
        let result = AnalysisConfig::builder().llm_blend_weight(1.4).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_empty_temperatures() {
        let result = AnalysisConfig::builder()
            .ensemble_temperatures(Vec::new())
            .build();
        assert!(result.is_err());
    }
}
