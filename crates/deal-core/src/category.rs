//! The closed set of investment categories
//!
//! Every analysis dimension is one of five variants. Keeping the set closed
//! (instead of string-keyed dispatch) lets the orchestrator match
//! exhaustively and the compiler catch a missing agent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One investment dimension of a pitch analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Founder,
    Market,
    Traction,
    Finance,
    Risk,
}

impl Category {
    /// All categories in canonical analysis order (Risk last)
    pub const ALL: [Category; 5] = [
        Category::Founder,
        Category::Market,
        Category::Traction,
        Category::Finance,
        Category::Risk,
    ];

    /// Canonical composite weight for this category
    ///
    /// Weights sum to 1.0 across [`Category::ALL`]. Callers may override
    /// them via investor preferences; overrides are renormalized before use.
    pub fn canonical_weight(self) -> f64 {
        match self {
            Category::Founder | Category::Market => 0.25,
            Category::Traction => 0.20,
            Category::Finance | Category::Risk => 0.15,
        }
    }

    /// Stable snake_case name, matching the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Founder => "founder",
            Category::Market => "market",
            Category::Traction => "traction",
            Category::Finance => "finance",
            Category::Risk => "risk",
        }
    }

    /// Title-case label for report text
    pub fn title(self) -> &'static str {
        match self {
            Category::Founder => "Founder",
            Category::Market => "Market",
            Category::Traction => "Traction",
            Category::Finance => "Finance",
            Category::Risk => "Risk",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "founder" => Ok(Category::Founder),
            "market" => Ok(Category::Market),
            "traction" => Ok(Category::Traction),
            "finance" => Ok(Category::Finance),
            "risk" => Ok(Category::Risk),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown category: {other}"
            ))),
        }
    }
}
