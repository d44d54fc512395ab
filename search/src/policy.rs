//! Search policy: caller-supplied budgets and switches.

use std::time::{Duration, Instant};

use crate::error::SearchError;
use crate::outcome::{Budget, SearchStats};

/// Budgets and recording switches shared by every algorithm in the crate.
///
/// All budgets are explicit and checked once per main-loop iteration.
/// `None` means unbounded. Exceeding a budget ends the search with
/// [`crate::outcome::Outcome::ResourceExhausted`], never with an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPolicyV1 {
    /// Hard cap on node expansions (value trials for CSP search).
    pub max_expansions: Option<u64>,
    /// Hard cap on generated nodes, the root included.
    pub max_generated: Option<u64>,
    /// Depth cutoff for depth-first strategies.
    pub max_depth: Option<u32>,
    /// Wall-clock budget measured from the start of the call.
    pub time_limit: Option<Duration>,
    /// Record an ordered trace of expansions / assignments.
    pub record_trace: bool,
}

impl SearchPolicyV1 {
    /// Unbounded policy with tracing off. Same as `Default`.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_expansions(mut self, max: u64) -> Self {
        self.max_expansions = Some(max);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max: u32) -> Self {
        self.max_depth = Some(max);
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }

    /// Reject budgets that could never admit a single step.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] if `max_generated` is zero
    /// (the root itself is a generated node) or `time_limit` is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_generated == Some(0) {
            return Err(SearchError::InvalidPolicy {
                detail: "max_generated must be at least 1 (the root counts)".into(),
            });
        }
        if self.time_limit == Some(Duration::ZERO) {
            return Err(SearchError::InvalidPolicy {
                detail: "time_limit must be non-zero".into(),
            });
        }
        Ok(())
    }
}

/// Per-call budget checker. Owns the start instant of one search call.
#[derive(Debug)]
pub(crate) struct BudgetMeter<'p> {
    policy: &'p SearchPolicyV1,
    started: Instant,
}

impl<'p> BudgetMeter<'p> {
    pub(crate) fn start(policy: &'p SearchPolicyV1) -> Self {
        Self {
            policy,
            started: Instant::now(),
        }
    }

    /// The first exhausted budget, if any, given the counters so far.
    pub(crate) fn exhausted(&self, stats: &SearchStats) -> Option<Budget> {
        if self
            .policy
            .max_expansions
            .is_some_and(|max| stats.expansions >= max)
        {
            return Some(Budget::Expansions);
        }
        if self
            .policy
            .max_generated
            .is_some_and(|max| stats.generated >= max)
        {
            return Some(Budget::GeneratedNodes);
        }
        if self
            .policy
            .time_limit
            .is_some_and(|limit| self.started.elapsed() >= limit)
        {
            return Some(Budget::Time);
        }
        None
    }
}
