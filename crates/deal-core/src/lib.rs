//! Core abstractions for deal-rs
//!
//! This crate defines the fundamental traits and types used throughout the
//! deal-rs pitch analysis framework: the closed set of investment categories,
//! the `CategoryAgent` trait, the immutable `AgentResult` model, and the
//! tri-state `AgentOutcome` used by the orchestrator to keep degradation
//! paths visible in the type system.

pub mod agent;
pub mod category;
pub mod context;
pub mod error;
pub mod outcome;
pub mod result;

pub use agent::CategoryAgent;
pub use category::Category;
pub use context::AnalysisContext;
pub use error::{Error, Result};
pub use outcome::AgentOutcome;
pub use result::{AgentResult, CalculationDetails, Evidence, EvidenceKind, EvidenceSource};
