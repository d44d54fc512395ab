//! Result conventions shared by graph search, AO* and CSP search.

use crate::cost::Cost;

/// Which caller-supplied budget ended a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Budget {
    /// `max_expansions` was reached.
    Expansions,
    /// `max_generated` was reached.
    GeneratedNodes,
    /// `max_depth` cut at least one branch and no goal was found.
    Depth,
    /// `time_limit` elapsed.
    Time,
}

impl Budget {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Budget::Expansions => "expansions",
            Budget::GeneratedNodes => "generated_nodes",
            Budget::Depth => "depth",
            Budget::Time => "time",
        }
    }
}

/// How a search ended.
///
/// `NoSolution` means the space was exhausted: the problem is proven to have
/// no solution. `ResourceExhausted` means the search was inconclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Solved(T),
    NoSolution,
    ResourceExhausted(Budget),
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    #[must_use]
    pub fn solution(&self) -> Option<&T> {
        match self {
            Outcome::Solved(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_solution(self) -> Option<T> {
        match self {
            Outcome::Solved(t) => Some(t),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Solved(t) => Outcome::Solved(f(t)),
            Outcome::NoSolution => Outcome::NoSolution,
            Outcome::ResourceExhausted(b) => Outcome::ResourceExhausted(b),
        }
    }
}

/// Counters collected during one call.
///
/// Graph searches fill the frontier counters; CSP search fills
/// `expansions` (value trials), `generated` (variables selected) and the
/// backtracking counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expansions: u64,
    pub generated: u64,
    pub duplicates_suppressed: u64,
    /// Heap entries discarded on pop because a cheaper path was recorded.
    pub stale_pops: u64,
    /// Expanded states re-expanded after a strictly cheaper path was found.
    pub reopened: u64,
    pub frontier_high_water: u64,
    pub max_depth_reached: u32,
    /// Edges where `h(parent) > cost + h(child)`.
    pub heuristic_inconsistencies: u64,
    pub backtracks: u64,
    /// Backtracks that skipped at least one intermediate level.
    pub backjumps: u64,
    pub levels_skipped: u64,
}

impl SearchStats {
    pub(crate) fn observe_frontier(&mut self, len: usize) {
        let len = len as u64;
        if len > self.frontier_high_water {
            self.frontier_high_water = len;
        }
    }

    pub(crate) fn observe_depth(&mut self, depth: u32) {
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }
}

/// Result of one search call: the outcome, its counters, and the optional
/// trace (empty unless `SearchPolicyV1::record_trace`).
#[derive(Debug, Clone)]
pub struct SearchRun<T, E = ()> {
    pub outcome: Outcome<T>,
    pub stats: SearchStats,
    pub trace: Vec<E>,
}

impl<T, E> SearchRun<T, E> {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.outcome.is_solved()
    }

    #[must_use]
    pub fn solution(&self) -> Option<&T> {
        self.outcome.solution()
    }
}

/// A path from start to goal, both included, with its total edge cost.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSolution<S> {
    pub path: Vec<S>,
    pub cost: Cost,
}

impl<S> PathSolution<S> {
    /// Number of edges on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One frontier pop recorded in the trace of a graph search.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandEvent<S> {
    /// Total order of expansions within the call.
    pub expansion_order: u64,
    pub node_id: usize,
    pub parent_id: Option<usize>,
    pub state: S,
    pub depth: u32,
    pub g_cost: Cost,
    pub f_cost: Cost,
}

/// Graph-search result type.
pub type PathRun<S> = SearchRun<PathSolution<S>, ExpandEvent<S>>;
