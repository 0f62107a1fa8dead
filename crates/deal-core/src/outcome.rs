//! Tri-state outcome of a category agent run
//!
//! The orchestrator never catches a blanket error: each agent run resolves
//! to `Ok`, `Degraded` (a usable result produced under failure, e.g. a
//! substituted fallback), or `Fatal`. `Fatal` exists so callers running a
//! single category can see the raw failure; the comprehensive pipeline
//! always converts it into a `Degraded` fallback before aggregation.

use crate::AgentResult;

/// Outcome of one category agent invocation
#[derive(Debug, Clone)]
pub enum AgentOutcome {
    /// Analysis completed normally
    Ok(AgentResult),
    /// A result exists, but something failed along the way
    Degraded(AgentResult, String),
    /// No result could be produced
    Fatal(String),
}

impl AgentOutcome {
    /// The carried result, if any
    pub fn result(&self) -> Option<&AgentResult> {
        match self {
            AgentOutcome::Ok(result) | AgentOutcome::Degraded(result, _) => Some(result),
            AgentOutcome::Fatal(_) => None,
        }
    }

    /// Consume the outcome, yielding the carried result if any
    pub fn into_result(self) -> Option<AgentResult> {
        match self {
            AgentOutcome::Ok(result) | AgentOutcome::Degraded(result, _) => Some(result),
            AgentOutcome::Fatal(_) => None,
        }
    }

    /// Degradation reason, if the run did not complete normally
    pub fn reason(&self) -> Option<&str> {
        match self {
            AgentOutcome::Ok(_) => None,
            AgentOutcome::Degraded(_, reason) | AgentOutcome::Fatal(reason) => Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AgentOutcome::Ok(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AgentOutcome::Degraded(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    #[test]
    fn test_accessors() {
        let ok = AgentOutcome::Ok(AgentResult::new(Category::Founder, 70.0, 0.8));
        assert!(ok.is_ok());
        assert!(ok.reason().is_none());
        assert_eq!(ok.result().unwrap().score, 70.0);

        let degraded = AgentOutcome::Degraded(
            AgentResult::new(Category::Finance, 65.0, 0.6),
            "provider timeout".to_string(),
        );
        assert!(degraded.is_degraded());
        assert_eq!(degraded.reason(), Some("provider timeout"));

        let fatal = AgentOutcome::Fatal("no provider".to_string());
        assert!(fatal.result().is_none());
        assert!(fatal.into_result().is_none());
    }
}
