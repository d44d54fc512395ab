//! Uninformed search: breadth-first, uniform-cost, depth-first,
//! iterative deepening and bidirectional.
//!
//! Every entry point validates the policy and the endpoints before any
//! expansion, returns `[start]` at cost 0 when `start == goal`, and reports
//! an exhausted frontier as [`Outcome::NoSolution`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::best_first::{best_first, checked_edge_cost, preflight, trivial_run, Keying};
use crate::cost::Cost;
use crate::error::{ModelError, SearchError};
use crate::frontier::{FifoFrontier, Frontier, LifoFrontier};
use crate::model::{StateSpace, ZeroHeuristic};
use crate::node::NodeArena;
use crate::outcome::{Budget, ExpandEvent, Outcome, PathRun, PathSolution, SearchRun, SearchStats};
use crate::policy::{BudgetMeter, SearchPolicyV1};

/// Uninformed strategy selector for [`search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BreadthFirst,
    UniformCost,
    DepthFirst,
    IterativeDeepening,
    Bidirectional,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::BreadthFirst,
        Strategy::UniformCost,
        Strategy::DepthFirst,
        Strategy::IterativeDeepening,
        Strategy::Bidirectional,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "bfs",
            Strategy::UniformCost => "ucs",
            Strategy::DepthFirst => "dfs",
            Strategy::IterativeDeepening => "iddfs",
            Strategy::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy {0:?} (expected one of bfs, ucs, dfs, iddfs, bidirectional)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Run the uninformed `strategy` from `start` to `goal`.
///
/// # Errors
///
/// [`SearchError::InvalidPolicy`] for degenerate budgets;
/// [`SearchError::InvalidModel`] for an unknown start or goal, an invalid
/// edge cost met during search, or (bidirectional only) a graph without
/// predecessors.
pub fn search<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    strategy: Strategy,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError> {
    match strategy {
        Strategy::BreadthFirst => bfs(graph, start, goal, policy),
        Strategy::UniformCost => ucs(graph, start, goal, policy),
        Strategy::DepthFirst => dfs(graph, start, goal, policy),
        Strategy::IterativeDeepening => iddfs(graph, start, goal, policy),
        Strategy::Bidirectional => bidirectional(graph, start, goal, policy),
    }
}

fn expand_event<S: Clone>(arena: &NodeArena<S>, node_id: usize, order: u64) -> ExpandEvent<S> {
    let node = arena.get(node_id);
    ExpandEvent {
        expansion_order: order,
        node_id,
        parent_id: node.parent_id,
        state: node.state.clone(),
        depth: node.depth,
        g_cost: node.g_cost,
        f_cost: node.g_cost,
    }
}

fn solved<S: Clone>(arena: &NodeArena<S>, node_id: usize) -> Outcome<PathSolution<S>> {
    Outcome::Solved(PathSolution {
        path: arena.path_to(node_id),
        cost: arena.get(node_id).g_cost,
    })
}

fn finish<S>(
    algorithm: &'static str,
    outcome: Outcome<PathSolution<S>>,
    stats: SearchStats,
    trace: Vec<ExpandEvent<S>>,
) -> PathRun<S> {
    tracing::debug!(
        algorithm,
        solved = outcome.is_solved(),
        expansions = stats.expansions,
        generated = stats.generated,
        "search finished"
    );
    SearchRun {
        outcome,
        stats,
        trace,
    }
}

/// Breadth-first search. Returns a path with the fewest edges.
///
/// States are marked visited when first enqueued, so each state enters the
/// FIFO frontier at most once. The goal test happens on pop.
///
/// # Errors
///
/// See [`search`].
pub fn bfs<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError> {
    preflight(graph, start, goal, policy)?;
    if start == goal {
        return Ok(trivial_run(start));
    }

    let meter = BudgetMeter::start(policy);
    let mut stats = SearchStats::default();
    let mut trace = Vec::new();
    let mut arena = NodeArena::new();
    let mut frontier = FifoFrontier::new();
    let mut visited: HashSet<G::State> = HashSet::new();

    visited.insert(start.clone());
    frontier.push(arena.push_root(start.clone(), Cost::ZERO));
    stats.generated = 1;
    stats.observe_frontier(frontier.len());

    let outcome = loop {
        if let Some(budget) = meter.exhausted(&stats) {
            break Outcome::ResourceExhausted(budget);
        }
        let Some(node_id) = frontier.pop() else {
            break Outcome::NoSolution;
        };
        let state = arena.get(node_id).state.clone();
        if state == *goal {
            break solved(&arena, node_id);
        }

        stats.expansions += 1;
        stats.observe_depth(arena.get(node_id).depth);
        if policy.record_trace {
            trace.push(expand_event(&arena, node_id, stats.expansions - 1));
        }
        for (succ, cost) in graph.successors(&state) {
            let cost = checked_edge_cost(&state, &succ, cost)?;
            if !visited.insert(succ.clone()) {
                stats.duplicates_suppressed += 1;
                continue;
            }
            frontier.push(arena.push_child(node_id, succ, cost, Cost::ZERO));
            stats.generated += 1;
        }
        stats.observe_frontier(frontier.len());
    };
    Ok(finish("bfs", outcome, stats, trace))
}

/// Uniform-cost search. Returns a minimum-cost path.
///
/// # Errors
///
/// See [`search`].
pub fn ucs<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError> {
    best_first(graph, start, goal, &ZeroHeuristic, Keying::Uniform, policy)
}

/// Depth-first search. Returns the first goal reached in depth-first order,
/// exploring the first listed successor first.
///
/// States are marked visited when expanded. With `policy.max_depth` set,
/// nodes at that depth are not expanded; a failed search that cut any branch
/// ends in `ResourceExhausted(Depth)` rather than `NoSolution`.
///
/// # Errors
///
/// See [`search`].
pub fn dfs<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError> {
    preflight(graph, start, goal, policy)?;
    if start == goal {
        return Ok(trivial_run(start));
    }

    let meter = BudgetMeter::start(policy);
    let mut stats = SearchStats::default();
    let mut trace = Vec::new();
    let mut arena = NodeArena::new();
    let mut frontier = LifoFrontier::new();
    let mut visited: HashSet<G::State> = HashSet::new();
    let mut cut_off = false;

    frontier.push(arena.push_root(start.clone(), Cost::ZERO));
    stats.generated = 1;
    stats.observe_frontier(frontier.len());

    let outcome = loop {
        if let Some(budget) = meter.exhausted(&stats) {
            break Outcome::ResourceExhausted(budget);
        }
        let Some(node_id) = frontier.pop() else {
            break if cut_off {
                Outcome::ResourceExhausted(Budget::Depth)
            } else {
                Outcome::NoSolution
            };
        };
        let (state, depth) = {
            let node = arena.get(node_id);
            (node.state.clone(), node.depth)
        };
        if visited.contains(&state) {
            stats.stale_pops += 1;
            continue;
        }
        if state == *goal {
            break solved(&arena, node_id);
        }
        if policy.max_depth.is_some_and(|max| depth >= max) {
            cut_off = true;
            continue;
        }

        visited.insert(state.clone());
        stats.expansions += 1;
        stats.observe_depth(depth);
        if policy.record_trace {
            trace.push(expand_event(&arena, node_id, stats.expansions - 1));
        }
        let successors = graph.successors(&state);
        for (succ, cost) in successors.into_iter().rev() {
            let cost = checked_edge_cost(&state, &succ, cost)?;
            if visited.contains(&succ) {
                stats.duplicates_suppressed += 1;
                continue;
            }
            frontier.push(arena.push_child(node_id, succ, cost, Cost::ZERO));
            stats.generated += 1;
        }
        stats.observe_frontier(frontier.len());
    };
    Ok(finish("dfs", outcome, stats, trace))
}

/// Iterative-deepening depth-first search. Returns a path with the fewest
/// edges, using memory proportional to the depth.
///
/// Runs depth-limited DFS with limits `0, 1, 2, ...` up to
/// `policy.max_depth`. Cycles are avoided by checking the current path only.
/// An iteration that finishes without cutting any branch proves there is no
/// solution.
///
/// # Errors
///
/// See [`search`].
pub fn iddfs<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError> {
    preflight(graph, start, goal, policy)?;
    if start == goal {
        return Ok(trivial_run(start));
    }

    let meter = BudgetMeter::start(policy);
    let mut stats = SearchStats::default();
    let mut trace = Vec::new();
    let max_limit = policy.max_depth.unwrap_or(u32::MAX);

    let mut limit = 0;
    let outcome = 'deepen: loop {
        let mut arena = NodeArena::new();
        let mut frontier = LifoFrontier::new();
        let mut cut_off = false;
        frontier.push(arena.push_root(start.clone(), Cost::ZERO));
        stats.generated += 1;
        tracing::trace!(limit, "iddfs iteration");

        while let Some(node_id) = frontier.pop() {
            if let Some(budget) = meter.exhausted(&stats) {
                break 'deepen Outcome::ResourceExhausted(budget);
            }
            let (state, depth) = {
                let node = arena.get(node_id);
                (node.state.clone(), node.depth)
            };
            if state == *goal {
                break 'deepen solved(&arena, node_id);
            }
            let successors = graph.successors(&state);
            if depth >= limit {
                if successors.iter().any(|(s, _)| !arena.on_path(node_id, s)) {
                    cut_off = true;
                }
                continue;
            }

            stats.expansions += 1;
            stats.observe_depth(depth);
            if policy.record_trace {
                trace.push(expand_event(&arena, node_id, stats.expansions - 1));
            }
            for (succ, cost) in successors.into_iter().rev() {
                let cost = checked_edge_cost(&state, &succ, cost)?;
                if arena.on_path(node_id, &succ) {
                    stats.duplicates_suppressed += 1;
                    continue;
                }
                frontier.push(arena.push_child(node_id, succ, cost, Cost::ZERO));
                stats.generated += 1;
            }
            stats.observe_frontier(frontier.len());
        }

        if !cut_off {
            break Outcome::NoSolution;
        }
        if limit >= max_limit {
            break Outcome::ResourceExhausted(Budget::Depth);
        }
        limit += 1;
    };
    Ok(finish("iddfs", outcome, stats, trace))
}

/// One side of a bidirectional search: its own arena, frontier and
/// state-to-node map.
struct Side<S> {
    arena: NodeArena<S>,
    frontier: FifoFrontier,
    reached: HashMap<S, usize>,
}

impl<S: Clone + Eq + std::hash::Hash> Side<S> {
    fn rooted_at(state: &S) -> Self {
        let mut arena = NodeArena::new();
        let root = arena.push_root(state.clone(), Cost::ZERO);
        let mut frontier = FifoFrontier::new();
        frontier.push(root);
        Self {
            arena,
            frontier,
            reached: HashMap::from([(state.clone(), root)]),
        }
    }
}

/// Bidirectional breadth-first search.
///
/// Expands one node at a time from whichever side has the smaller frontier
/// (forward on ties). The backward side walks
/// [`StateSpace::predecessors`]. As soon as an expanded state has already
/// been reached by the other side, the two partial paths are joined there.
/// The reported cost is the sum of the edge costs on the joined path.
///
/// Trace node ids are local to each side's arena.
///
/// # Errors
///
/// [`ModelError::NotReversible`] (as [`SearchError::InvalidModel`]) when the
/// graph does not expose predecessors; otherwise see [`search`].
pub fn bidirectional<G: StateSpace>(
    graph: &G,
    start: &G::State,
    goal: &G::State,
    policy: &SearchPolicyV1,
) -> Result<PathRun<G::State>, SearchError> {
    preflight(graph, start, goal, policy)?;
    if !graph.is_reversible() {
        return Err(ModelError::NotReversible.into());
    }
    if start == goal {
        return Ok(trivial_run(start));
    }

    let meter = BudgetMeter::start(policy);
    let mut stats = SearchStats {
        generated: 2,
        frontier_high_water: 2,
        ..SearchStats::default()
    };
    let mut trace = Vec::new();
    let mut forward = Side::rooted_at(start);
    let mut backward = Side::rooted_at(goal);

    let outcome = loop {
        if let Some(budget) = meter.exhausted(&stats) {
            break Outcome::ResourceExhausted(budget);
        }
        if forward.frontier.is_empty() || backward.frontier.is_empty() {
            break Outcome::NoSolution;
        }
        let is_forward = forward.frontier.len() <= backward.frontier.len();
        let (this, other) = if is_forward {
            (&mut forward, &backward)
        } else {
            (&mut backward, &forward)
        };
        let Some(node_id) = this.frontier.pop() else {
            break Outcome::NoSolution;
        };
        let state = this.arena.get(node_id).state.clone();

        stats.expansions += 1;
        stats.observe_depth(this.arena.get(node_id).depth);
        if policy.record_trace {
            trace.push(expand_event(&this.arena, node_id, stats.expansions - 1));
        }
        if let Some(&meet) = other.reached.get(&state) {
            let (f_id, b_id) = if is_forward { (node_id, meet) } else { (meet, node_id) };
            break Outcome::Solved(join(&forward.arena, f_id, &backward.arena, b_id));
        }

        let neighbours = if is_forward {
            graph.successors(&state)
        } else {
            graph.predecessors(&state)
        };
        for (next, cost) in neighbours {
            let cost = if is_forward {
                checked_edge_cost(&state, &next, cost)?
            } else {
                checked_edge_cost(&next, &state, cost)?
            };
            if this.reached.contains_key(&next) {
                stats.duplicates_suppressed += 1;
                continue;
            }
            let child = this.arena.push_child(node_id, next.clone(), cost, Cost::ZERO);
            this.reached.insert(next, child);
            this.frontier.push(child);
            stats.generated += 1;
        }
        stats.observe_frontier(forward.frontier.len() + backward.frontier.len());
    };
    Ok(finish("bidirectional", outcome, stats, trace))
}

/// Join the forward path `start..meet` with the backward path `meet..goal`.
fn join<S: Clone>(
    forward: &NodeArena<S>,
    f_id: usize,
    backward: &NodeArena<S>,
    b_id: usize,
) -> PathSolution<S> {
    let mut path = forward.path_to(f_id);
    let mut tail = backward.path_to(b_id);
    tail.reverse();
    path.extend(tail.into_iter().skip(1));
    PathSolution {
        path,
        cost: forward.get(f_id).g_cost + backward.get(b_id).g_cost,
    }
}
