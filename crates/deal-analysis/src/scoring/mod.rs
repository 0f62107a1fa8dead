//! Statistical scoring engines
//!
//! Everything in this module is deterministic arithmetic: given the same
//! inputs, repeated calls return bit-identical output. The engines are
//! organized as:
//! - `normalize`: rescaling raw metrics onto the 0-100 scale
//! - `composite`: weighted aggregation with partial-coverage handling
//! - `benchmark`: cohort percentile comparison with static-band degradation
//! - `probability`: calibrated success probability from the composite

pub mod benchmark;
pub mod composite;
pub mod normalize;
pub mod probability;

pub use benchmark::{
    BenchmarkEngine, BenchmarkReport, CategoryBenchmark, CohortStats, CohortStore,
    InMemoryCohortStore, PerformanceBand,
};
pub use composite::{CompositeScore, CompositeScorer, ScoreExplanation};
pub use normalize::{NormalizationEngine, NormalizationMethod, ReferenceStats};
pub use probability::{SuccessBand, SuccessForecast, SuccessProbabilityModel};
