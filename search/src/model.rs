//! Graph model: state spaces, explicit adjacency graphs, heuristics.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::cost::Cost;
use crate::error::ModelError;

/// Trait for graphs that support search.
///
/// # Contract
///
/// - `successors` must be deterministic: same state → same successors in
///   the same order. The order is observable (DFS explores the first
///   successor first, ties in the priority frontier fall back to
///   generation order).
/// - Edge costs must be finite and non-negative. The searches check each
///   cost as it is generated and fail with [`ModelError::InvalidEdgeCost`].
/// - `contains` is the membership test used for pre-flight validation of
///   start and goal. Implicit spaces that cannot enumerate their states
///   return `true` for every well-formed state.
pub trait StateSpace {
    type State: Clone + Eq + Hash + Debug;

    /// Ordered `(successor, edge_cost)` pairs.
    fn successors(&self, state: &Self::State) -> Vec<(Self::State, Cost)>;

    /// Whether `state` belongs to the space.
    fn contains(&self, state: &Self::State) -> bool;

    /// Whether [`StateSpace::predecessors`] is implemented.
    fn is_reversible(&self) -> bool {
        false
    }

    /// Ordered `(predecessor, edge_cost)` pairs: every `p` with an edge
    /// `p -> state`. Only consulted when `is_reversible()` is true.
    fn predecessors(&self, _state: &Self::State) -> Vec<(Self::State, Cost)> {
        Vec::new()
    }
}

/// Explicit adjacency-list graph.
///
/// States are interned in insertion order; successor lists keep edge
/// insertion order. Undirected graphs store each edge in both directions.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<S> {
    directed: bool,
    index: HashMap<S, usize>,
    states: Vec<S>,
    outgoing: Vec<Vec<(usize, Cost)>>,
    incoming: Vec<Vec<(usize, Cost)>>,
    edge_count: usize,
}

impl<S: Clone + Eq + Hash + Debug> AdjacencyGraph<S> {
    #[must_use]
    pub fn directed() -> Self {
        Self::new(true)
    }

    #[must_use]
    pub fn undirected() -> Self {
        Self::new(false)
    }

    fn new(directed: bool) -> Self {
        Self {
            directed,
            index: HashMap::new(),
            states: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            edge_count: 0,
        }
    }

    /// Build a graph from `(from, to, cost)` triples.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidEdgeCost`] on the first negative or
    /// non-finite cost.
    pub fn from_edges<I, C>(directed: bool, edges: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (S, S, C)>,
        C: Into<Cost>,
    {
        let mut graph = Self::new(directed);
        for (from, to, cost) in edges {
            graph.add_edge(from, to, cost)?;
        }
        Ok(graph)
    }

    /// Intern a state (idempotent) and return its index.
    pub fn add_state(&mut self, state: S) -> usize {
        if let Some(&idx) = self.index.get(&state) {
            return idx;
        }
        let idx = self.states.len();
        self.index.insert(state.clone(), idx);
        self.states.push(state);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        idx
    }

    /// Add an edge, interning both endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidEdgeCost`] if `cost` is negative or not
    /// finite. The graph is left unchanged in that case.
    pub fn add_edge(&mut self, from: S, to: S, cost: impl Into<Cost>) -> Result<(), ModelError> {
        let cost = cost.into();
        if !cost.is_valid_edge_cost() {
            return Err(ModelError::invalid_edge_cost(&from, &to, cost.value()));
        }
        let f = self.add_state(from);
        let t = self.add_state(to);
        self.outgoing[f].push((t, cost));
        self.incoming[t].push((f, cost));
        if !self.directed && f != t {
            self.outgoing[t].push((f, cost));
            self.incoming[f].push((t, cost));
        }
        self.edge_count += 1;
        Ok(())
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of `add_edge` calls that succeeded (an undirected edge counts once).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// States in insertion order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.states.iter()
    }

    /// Cheapest direct edge `from -> to`, if any.
    #[must_use]
    pub fn edge_cost(&self, from: &S, to: &S) -> Option<Cost> {
        let f = *self.index.get(from)?;
        let t = *self.index.get(to)?;
        self.outgoing[f]
            .iter()
            .filter(|(dst, _)| *dst == t)
            .map(|(_, c)| *c)
            .min()
    }

    /// Total cost of `path` if every consecutive pair is an edge.
    #[must_use]
    pub fn path_cost(&self, path: &[S]) -> Option<Cost> {
        path.windows(2)
            .map(|pair| self.edge_cost(&pair[0], &pair[1]))
            .sum()
    }

    fn expand(&self, lists: &[Vec<(usize, Cost)>], state: &S) -> Vec<(S, Cost)> {
        match self.index.get(state) {
            Some(&idx) => lists[idx]
                .iter()
                .map(|&(n, c)| (self.states[n].clone(), c))
                .collect(),
            None => Vec::new(),
        }
    }
}

impl<S: Clone + Eq + Hash + Debug> StateSpace for AdjacencyGraph<S> {
    type State = S;

    fn successors(&self, state: &S) -> Vec<(S, Cost)> {
        self.expand(&self.outgoing, state)
    }

    fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    fn is_reversible(&self) -> bool {
        true
    }

    fn predecessors(&self, state: &S) -> Vec<(S, Cost)> {
        self.expand(&self.incoming, state)
    }
}

/// Estimate of the remaining cost from a state to the goal.
///
/// A* is optimal only for admissible estimates (never above the true
/// remaining cost). Estimates must be finite and non-negative.
pub trait Heuristic<S> {
    fn estimate(&self, state: &S) -> Cost;
}

impl<S, F> Heuristic<S> for F
where
    F: Fn(&S) -> f64,
{
    fn estimate(&self, state: &S) -> Cost {
        Cost::new(self(state))
    }
}

/// The zero heuristic: turns A* into uniform-cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<S> Heuristic<S> for ZeroHeuristic {
    fn estimate(&self, _state: &S) -> Cost {
        Cost::ZERO
    }
}

/// Explicit per-state estimates; states without an entry estimate 0.
#[derive(Debug, Clone)]
pub struct HeuristicTable<S> {
    values: HashMap<S, Cost>,
}

impl<S: Eq + Hash> HeuristicTable<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, state: S, estimate: impl Into<Cost>) {
        self.values.insert(state, estimate.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Eq + Hash> Default for HeuristicTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Eq + Hash, C: Into<Cost>> FromIterator<(S, C)> for HeuristicTable<S> {
    fn from_iter<I: IntoIterator<Item = (S, C)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(s, c)| (s, c.into())).collect(),
        }
    }
}

impl<S: Eq + Hash> Heuristic<S> for HeuristicTable<S> {
    fn estimate(&self, state: &S) -> Cost {
        self.values.get(state).copied().unwrap_or(Cost::ZERO)
    }
}
