//! Informed path search: A* and greedy best-first.

use crate::best_first::{best_first, Keying};
use crate::error::SearchError;
use crate::model::{Heuristic, StateSpace};
use crate::outcome::PathRun;
use crate::policy::SearchPolicyV1;

/// A* search from `start` to `goal`.
///
/// The frontier is ordered by `f = g + h`; equal `f` prefers the smaller
/// `h`, then the older entry. With an admissible `heuristic` the returned
/// cost is minimal. An inconsistent but admissible heuristic still yields
/// the minimal cost: expanded states are reopened when a strictly cheaper
/// path turns up (`stats.reopened`). Edges where `f` decreases are counted
/// in `stats.heuristic_inconsistencies`.
///
/// # Errors
///
/// [`SearchError::InvalidPolicy`] for degenerate budgets;
/// [`SearchError::InvalidModel`] for an unknown start or goal, or when an
/// invalid edge cost or heuristic estimate is met during search.
pub fn a_star<G, H>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    heuristic: &H,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError>
where
    G: StateSpace,
    H: Heuristic<G::State> + ?Sized,
{
    best_first(graph, start, goal, heuristic, Keying::AStar, policy)
}

/// Greedy best-first search: expands the state with the smallest estimate.
///
/// Fast on good heuristics, with no optimality guarantee. States are never
/// reopened.
///
/// # Errors
///
/// Same as [`a_star`].
pub fn greedy_best_first<G, H>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    heuristic: &H,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError>
where
    G: StateSpace,
    H: Heuristic<G::State> + ?Sized,
{
    best_first(graph, start, goal, heuristic, Keying::Greedy, policy)
}
