//! Shared utilities for deal-rs
//!
//! Logging setup, the descriptive statistics used by consensus and
//! composite scoring, and the injectable numeric backend behind the
//! normalization and probability engines.

pub mod logging;
pub mod numeric;
pub mod stats;

pub use logging::init_tracing;
pub use numeric::{Numerics, PolyNumerics, StdNumerics};
