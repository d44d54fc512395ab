//! Typed search errors.
//!
//! `SearchError` covers malformed inputs only. Runtime terminations (goal
//! reached, frontier exhausted, budget exhausted) are expressed via
//! [`crate::outcome::Outcome`] and always come back as `Ok(SearchRun)`.

use thiserror::Error;

/// A problem model that cannot be searched.
///
/// States and variables are rendered with their `Debug` form so the error
/// stays independent of the client's state type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("start state {state} is not part of the graph")]
    UnknownStart { state: String },

    #[error("goal state {state} is not part of the graph")]
    UnknownGoal { state: String },

    #[error("edge {from} -> {to} has invalid cost {cost} (must be finite and non-negative)")]
    InvalidEdgeCost { from: String, to: String, cost: f64 },

    #[error("heuristic estimate {estimate} for {state} is invalid (must be finite and non-negative)")]
    InvalidHeuristic { state: String, estimate: f64 },

    #[error("graph does not expose predecessors; bidirectional search needs a reversible graph")]
    NotReversible,

    #[error("branch of {node} has no children")]
    EmptyBranch { node: String },

    #[error("variable {variable} has an empty domain")]
    EmptyDomain { variable: String },

    #[error("unknown variable {variable}")]
    UnknownVariable { variable: String },

    #[error("variable name {name} is declared twice")]
    DuplicateVariable { name: String },

    #[error("constraint {constraint} has an empty scope")]
    EmptyScope { constraint: String },
}

/// Typed failure for pre-flight validation and model checks.
///
/// When one of these is returned no result is produced: either the search
/// never started, or it stopped the moment the model was found to be
/// malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },
}

impl ModelError {
    pub(crate) fn unknown_start(state: &impl std::fmt::Debug) -> Self {
        Self::UnknownStart {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn unknown_goal(state: &impl std::fmt::Debug) -> Self {
        Self::UnknownGoal {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn invalid_edge_cost(
        from: &impl std::fmt::Debug,
        to: &impl std::fmt::Debug,
        cost: f64,
    ) -> Self {
        Self::InvalidEdgeCost {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
            cost,
        }
    }

    pub(crate) fn invalid_heuristic(state: &impl std::fmt::Debug, estimate: f64) -> Self {
        Self::InvalidHeuristic {
            state: format!("{state:?}"),
            estimate,
        }
    }
}
