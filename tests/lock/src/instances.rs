//! Seeded random instances and exhaustive reference answers.
//!
//! Everything here is small enough to enumerate, so the engine's answers can
//! be checked against brute force. Instances are drawn from
//! `StdRng::seed_from_u64`, so a failing seed reproduces exactly.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wayfind_search::csp::{AllowedPairs, Csp, VarId};
use wayfind_search::{AdjacencyGraph, AndOrGraph, BranchKind, HeuristicTable};

// ---------------------------------------------------------------------------
// Weighted digraphs
// ---------------------------------------------------------------------------

/// A directed graph over states `0..n` with integer edge costs.
#[derive(Debug, Clone)]
pub struct RandomGraph {
    pub n: usize,
    /// `(from, to, cost)`, no self-loops, no parallel edges.
    pub edges: Vec<(usize, usize, u32)>,
}

impl RandomGraph {
    /// `n` states; each ordered pair gets an edge with probability `density`
    /// and a cost in `1..=max_cost`.
    ///
    /// # Panics
    ///
    /// Panics if `density` is outside `0.0..=1.0`.
    #[must_use]
    pub fn generate(seed: u64, n: usize, density: f64, max_cost: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut edges = Vec::new();
        for from in 0..n {
            for to in 0..n {
                if from != to && rng.gen_bool(density) {
                    edges.push((from, to, rng.gen_range(1..=max_cost)));
                }
            }
        }
        Self { n, edges }
    }

    /// The graph with every state declared, so isolated states still count
    /// as members.
    ///
    /// # Panics
    ///
    /// Never: generated costs are positive.
    #[must_use]
    pub fn graph(&self) -> AdjacencyGraph<usize> {
        let mut graph = AdjacencyGraph::directed();
        for state in 0..self.n {
            graph.add_state(state);
        }
        for &(from, to, cost) in &self.edges {
            graph.add_edge(from, to, cost).unwrap();
        }
        graph
    }

    fn out_edges(&self, from: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.edges
            .iter()
            .filter(move |(f, _, _)| *f == from)
            .map(|&(_, to, cost)| (to, cost))
    }

    /// Every simple path from `start` to `goal` as `(edges, cost)`.
    #[must_use]
    pub fn simple_paths(&self, start: usize, goal: usize) -> Vec<(usize, u32)> {
        let mut found = Vec::new();
        let mut on_path = vec![false; self.n];
        self.walk(start, goal, 0, 0, &mut on_path, &mut found);
        found
    }

    fn walk(
        &self,
        at: usize,
        goal: usize,
        edges: usize,
        cost: u32,
        on_path: &mut [bool],
        found: &mut Vec<(usize, u32)>,
    ) {
        if at == goal {
            found.push((edges, cost));
            return;
        }
        on_path[at] = true;
        for (next, step) in self.out_edges(at) {
            if !on_path[next] {
                self.walk(next, goal, edges + 1, cost + step, on_path, found);
            }
        }
        on_path[at] = false;
    }

    /// Cheapest `start -> goal` cost by enumeration.
    #[must_use]
    pub fn min_cost(&self, start: usize, goal: usize) -> Option<u32> {
        self.simple_paths(start, goal).into_iter().map(|(_, c)| c).min()
    }

    /// Fewest edges on any `start -> goal` path by enumeration.
    #[must_use]
    pub fn min_edges(&self, start: usize, goal: usize) -> Option<usize> {
        self.simple_paths(start, goal).into_iter().map(|(e, _)| e).min()
    }

    /// An admissible estimate: the true remaining cost scaled by a random
    /// factor in `[0, 1]`. States that cannot reach the goal get 0.
    #[must_use]
    pub fn admissible_heuristic(&self, seed: u64, goal: usize) -> HeuristicTable<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..self.n)
            .map(|state| {
                let remaining = self.min_cost(state, goal).map_or(0.0, f64::from);
                (state, remaining * rng.gen_range(0.0..=1.0))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// AND-OR DAGs
// ---------------------------------------------------------------------------

/// An acyclic AND-OR graph over states `0..n`. Children always have larger
/// indices; state `n - 1` is the goal.
#[derive(Debug, Clone)]
pub struct RandomAndOr {
    pub n: usize,
    pub branches: Vec<(usize, BranchKind, Vec<usize>)>,
}

impl RandomAndOr {
    #[must_use]
    pub fn generate(seed: u64, n: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut branches = Vec::new();
        for node in 0..n.saturating_sub(1) {
            // Some interior nodes are left without branches: dead ends.
            let count = rng.gen_range(0..=2);
            for _ in 0..count {
                let kind = if rng.gen_bool(0.5) {
                    BranchKind::And
                } else {
                    BranchKind::Or
                };
                let width = rng.gen_range(1..=3);
                let children: BTreeSet<usize> = (0..width).map(|_| rng.gen_range(node + 1..n)).collect();
                branches.push((node, kind, children.into_iter().collect()));
            }
        }
        Self { n, branches }
    }

    #[must_use]
    pub fn goal(&self) -> usize {
        self.n - 1
    }

    /// # Panics
    ///
    /// Never: every generated branch has at least one child.
    #[must_use]
    pub fn graph(&self) -> AndOrGraph<usize> {
        let mut graph = AndOrGraph::new();
        for state in 0..self.n {
            graph.add_state(state);
        }
        for (node, kind, children) in &self.branches {
            graph.add_branch(*node, *kind, children.iter().copied()).unwrap();
        }
        graph
    }

    /// Unit-step cost of `state` by direct recursion over the DAG.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reference_cost(&self, state: usize) -> f64 {
        if state == self.goal() {
            return 0.0;
        }
        self.branches
            .iter()
            .filter(|(node, _, _)| *node == state)
            .map(|(_, kind, children)| {
                let costs = children.iter().map(|&child| self.reference_cost(child));
                let width = children.len() as f64;
                match kind {
                    BranchKind::And => costs.sum::<f64>() + width,
                    BranchKind::Or => costs.fold(f64::INFINITY, f64::min) + 1.0,
                }
            })
            .fold(f64::INFINITY, f64::min)
    }
}

// ---------------------------------------------------------------------------
// Binary CSPs
// ---------------------------------------------------------------------------

/// A binary CSP over small integer domains, every constraint a table of
/// allowed pairs.
#[derive(Debug, Clone)]
pub struct RandomCsp {
    pub domain_sizes: Vec<u8>,
    /// `(a, b, allowed)` with `a < b`.
    pub tables: Vec<(usize, usize, BTreeSet<(u8, u8)>)>,
}

impl RandomCsp {
    /// `n` variables with domains of size `2..=max_domain`; each variable
    /// pair is constrained with probability `density`, and each value pair of
    /// a constrained variable pair is allowed with probability `tightness`.
    #[must_use]
    pub fn generate(seed: u64, n: usize, max_domain: u8, density: f64, tightness: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let domain_sizes: Vec<u8> = (0..n).map(|_| rng.gen_range(2..=max_domain)).collect();
        let mut tables = Vec::new();
        for a in 0..n {
            for b in a + 1..n {
                if !rng.gen_bool(density) {
                    continue;
                }
                let mut allowed = BTreeSet::new();
                for va in 0..domain_sizes[a] {
                    for vb in 0..domain_sizes[b] {
                        if rng.gen_bool(tightness) {
                            allowed.insert((va, vb));
                        }
                    }
                }
                tables.push((a, b, allowed));
            }
        }
        Self { domain_sizes, tables }
    }

    /// # Panics
    ///
    /// Never: names are unique and every scope is declared.
    #[must_use]
    pub fn csp(&self) -> Csp<u8> {
        let mut csp = Csp::new();
        let vars: Vec<VarId> = self
            .domain_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| csp.add_variable(format!("x{i}"), 0..size).unwrap())
            .collect();
        for (a, b, allowed) in &self.tables {
            csp.add_constraint(AllowedPairs::new(vars[*a], vars[*b], allowed.iter().copied()))
                .unwrap();
        }
        csp
    }

    /// Whether `values` (indexed by variable) satisfies every table.
    #[must_use]
    pub fn satisfied_by(&self, values: &[u8]) -> bool {
        self.tables
            .iter()
            .all(|(a, b, allowed)| allowed.contains(&(values[*a], values[*b])))
    }

    /// Number of complete assignments satisfying every table.
    #[must_use]
    pub fn count_solutions(&self) -> usize {
        let mut values = vec![0u8; self.domain_sizes.len()];
        self.count_from(0, &mut values)
    }

    fn count_from(&self, var: usize, values: &mut [u8]) -> usize {
        if var == values.len() {
            return usize::from(self.satisfied_by(values));
        }
        (0..self.domain_sizes[var])
            .map(|value| {
                values[var] = value;
                self.count_from(var + 1, values)
            })
            .sum()
    }
}
