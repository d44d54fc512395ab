//! Shared best-first expansion loop behind UCS, A* and greedy search.

use std::collections::{HashMap, HashSet};

use crate::cost::Cost;
use crate::error::{ModelError, SearchError};
use crate::frontier::{Frontier, PriorityFrontier};
use crate::model::{Heuristic, StateSpace};
use crate::node::NodeArena;
use crate::outcome::{ExpandEvent, Outcome, PathRun, PathSolution, SearchRun, SearchStats};
use crate::policy::{BudgetMeter, SearchPolicyV1};

/// Which frontier key a best-first run orders by. See [`crate::node::FrontierKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keying {
    /// `(g, 0)`: uniform-cost search.
    Uniform,
    /// `(g + h, h)`: A*.
    AStar,
    /// `(h, g)`: greedy best-first. Never reopens expanded states.
    Greedy,
}

impl Keying {
    fn key(self, g: Cost, h: Cost) -> (Cost, Cost) {
        match self {
            Keying::Uniform => (g, Cost::ZERO),
            Keying::AStar => (g + h, h),
            Keying::Greedy => (h, g),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Keying::Uniform => "ucs",
            Keying::AStar => "a_star",
            Keying::Greedy => "greedy",
        }
    }
}

/// Pre-flight checks shared by every path search: policy budgets, then
/// membership of start and goal.
pub(crate) fn preflight<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    policy: &SearchPolicyV1,
) -> Result<(), SearchError> {
    policy.validate()?;
    if !graph.contains(start) {
        return Err(ModelError::unknown_start(start).into());
    }
    if !graph.contains(goal) {
        return Err(ModelError::unknown_goal(goal).into());
    }
    Ok(())
}

/// The run returned when `start == goal`: one-state path, zero cost.
pub(crate) fn trivial_run<S: Clone>(start: &S) -> PathRun<S> {
    SearchRun {
        outcome: Outcome::Solved(PathSolution {
            path: vec![start.clone()],
            cost: Cost::ZERO,
        }),
        stats: SearchStats {
            generated: 1,
            ..SearchStats::default()
        },
        trace: Vec::new(),
    }
}

pub(crate) fn checked_edge_cost<S: std::fmt::Debug>(
    from: &S,
    to: &S,
    cost: Cost,
) -> Result<Cost, SearchError> {
    if cost.is_valid_edge_cost() {
        Ok(cost)
    } else {
        Err(ModelError::invalid_edge_cost(from, to, cost.value()).into())
    }
}

fn checked_estimate<S, H>(heuristic: &H, state: &S) -> Result<Cost, SearchError>
where
    S: std::fmt::Debug,
    H: Heuristic<S> + ?Sized,
{
    let h = heuristic.estimate(state);
    if h.is_valid_edge_cost() {
        Ok(h)
    } else {
        Err(ModelError::invalid_heuristic(state, h.value()).into())
    }
}

/// Run best-first search from `start` until `goal` is popped.
///
/// The goal test happens on pop, so for [`Keying::Uniform`] and (with an
/// admissible heuristic) [`Keying::AStar`] the returned cost is minimal.
/// `best_g` holds the cheapest known g per state; a popped entry above it is
/// stale and discarded. A strictly cheaper path to an expanded state puts it
/// back on the frontier (except under [`Keying::Greedy`]).
pub(crate) fn best_first<G, H>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    heuristic: &H,
    keying: Keying,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError>
where
    G: StateSpace,
    H: Heuristic<G::State> + ?Sized,
{
    preflight(graph, start, goal, policy)?;
    if start == goal {
        return Ok(trivial_run(start));
    }

    let meter = BudgetMeter::start(policy);
    let mut stats = SearchStats::default();
    let mut trace = Vec::new();
    let mut arena = NodeArena::new();
    let mut frontier = PriorityFrontier::new();
    let mut best_g: HashMap<G::State, Cost> = HashMap::new();
    let mut closed: HashSet<G::State> = HashSet::new();
    let mut warned_inconsistent = false;

    let h_start = checked_estimate(heuristic, start)?;
    let root = arena.push_root(start.clone(), h_start);
    best_g.insert(start.clone(), Cost::ZERO);
    let (primary, secondary) = keying.key(Cost::ZERO, h_start);
    frontier.push_keyed(root, primary, secondary);
    stats.generated = 1;
    stats.observe_frontier(frontier.len());

    let outcome = loop {
        if let Some(budget) = meter.exhausted(&stats) {
            break Outcome::ResourceExhausted(budget);
        }
        let Some((node_id, _)) = frontier.pop_keyed() else {
            break Outcome::NoSolution;
        };

        let node = arena.get(node_id);
        let (state, g, h, depth) = (node.state.clone(), node.g_cost, node.h_cost, node.depth);
        if best_g.get(&state).is_some_and(|&best| best < g) || closed.contains(&state) {
            stats.stale_pops += 1;
            continue;
        }
        if state == *goal {
            break Outcome::Solved(PathSolution {
                path: arena.path_to(node_id),
                cost: g,
            });
        }

        closed.insert(state.clone());
        stats.expansions += 1;
        stats.observe_depth(depth);
        tracing::trace!(algorithm = keying.name(), ?state, g = g.value(), "expand");
        if policy.record_trace {
            trace.push(ExpandEvent {
                expansion_order: stats.expansions - 1,
                node_id,
                parent_id: node.parent_id,
                state: state.clone(),
                depth,
                g_cost: g,
                f_cost: g + h,
            });
        }

        for (succ, cost) in graph.successors(&state) {
            let cost = checked_edge_cost(&state, &succ, cost)?;
            let g_succ = g + cost;
            let seen = best_g.get(&succ).copied();
            let improves = match seen {
                None => true,
                Some(_) if keying == Keying::Greedy => false,
                Some(best) => g_succ < best,
            };
            if !improves {
                stats.duplicates_suppressed += 1;
                continue;
            }

            let h_succ = checked_estimate(heuristic, &succ)?;
            if h > cost + h_succ {
                stats.heuristic_inconsistencies += 1;
                if !warned_inconsistent {
                    warned_inconsistent = true;
                    tracing::warn!(
                        from = ?state,
                        to = ?succ,
                        "heuristic is inconsistent on this edge; optimality now relies on admissibility"
                    );
                }
            }
            if closed.remove(&succ) {
                stats.reopened += 1;
            }
            best_g.insert(succ.clone(), g_succ);
            let child = arena.push_child(node_id, succ, cost, h_succ);
            stats.generated += 1;
            let (primary, secondary) = keying.key(g_succ, h_succ);
            frontier.push_keyed(child, primary, secondary);
        }
        stats.observe_frontier(frontier.len());
    };

    tracing::debug!(
        algorithm = keying.name(),
        solved = outcome.is_solved(),
        expansions = stats.expansions,
        generated = stats.generated,
        "search finished"
    );
    Ok(SearchRun {
        outcome,
        stats,
        trace,
    })
}
