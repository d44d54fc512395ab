//! AND-OR graphs and the AO* cost evaluator.
//!
//! A node's successors are grouped into branches tagged [`BranchKind::And`]
//! (every child must be solved) or [`BranchKind::Or`] (one child suffices).
//! Costs use unit steps:
//!
//! - the goal costs 0;
//! - a non-goal node with no branches costs +inf (dead end);
//! - an AND branch costs the sum of its children plus the number of children;
//! - an OR branch costs its cheapest child plus 1;
//! - a node costs the minimum over its branches.
//!
//! [`AoStar`] evaluates these costs iteratively. It first discovers the
//! subgraph below the queried node with an explicit worklist, then settles
//! nodes in increasing cost order from a priority queue. Both AND and OR
//! costs are at least one more than any child they depend on, so the first
//! settled value of a node is final. Settled nodes are memoized and never
//! evaluated again, by this query or any later one. Cycles with no exit to
//! the goal leave their nodes unsolved.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use crate::cost::Cost;
use crate::error::{ModelError, SearchError};
use crate::outcome::{Budget, Outcome, SearchRun, SearchStats};
use crate::policy::{BudgetMeter, SearchPolicyV1};

/// How a branch combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    And,
    Or,
}

impl BranchKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::And => "and",
            BranchKind::Or => "or",
        }
    }
}

/// One successor group of a node. Children are node handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub kind: BranchKind,
    pub children: Vec<usize>,
}

/// Explicit AND-OR graph with interned states.
#[derive(Debug, Clone)]
pub struct AndOrGraph<S> {
    states: Vec<S>,
    index: HashMap<S, usize>,
    branches: Vec<Vec<Branch>>,
}

impl<S: Clone + Eq + Hash + Debug> AndOrGraph<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            index: HashMap::new(),
            branches: Vec::new(),
        }
    }

    /// Intern a state (idempotent) and return its handle.
    pub fn add_state(&mut self, state: S) -> usize {
        if let Some(&id) = self.index.get(&state) {
            return id;
        }
        let id = self.states.len();
        self.index.insert(state.clone(), id);
        self.states.push(state);
        self.branches.push(Vec::new());
        id
    }

    /// Add a branch of `kind` from `node` to `children`.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptyBranch`] when `children` is empty.
    pub fn add_branch<I>(&mut self, node: S, kind: BranchKind, children: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = S>,
    {
        let children: Vec<S> = children.into_iter().collect();
        if children.is_empty() {
            return Err(ModelError::EmptyBranch {
                node: format!("{node:?}"),
            });
        }
        let parent = self.add_state(node);
        let children = children.into_iter().map(|c| self.add_state(c)).collect();
        self.branches[parent].push(Branch { kind, children });
        Ok(())
    }

    #[must_use]
    pub fn node(&self, state: &S) -> Option<usize> {
        self.index.get(state).copied()
    }

    #[must_use]
    pub fn state(&self, node: usize) -> &S {
        &self.states[node]
    }

    #[must_use]
    pub fn branches(&self, node: usize) -> &[Branch] {
        &self.branches[node]
    }

    #[must_use]
    pub fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<S: Clone + Eq + Hash + Debug> Default for AndOrGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A node of the solution graph with the branch it commits to.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionNode<S> {
    pub state: S,
    pub cost: Cost,
    /// `None` for goal nodes.
    pub kind: Option<BranchKind>,
    /// Every child of an AND branch, or the chosen child of an OR branch.
    pub children: Vec<S>,
}

/// The solved subgraph reachable from the root through best branches.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionGraph<S> {
    pub root: S,
    pub cost: Cost,
    /// Breadth-first from the root; each state appears once.
    pub nodes: Vec<SolutionNode<S>>,
}

impl<S: PartialEq> SolutionGraph<S> {
    #[must_use]
    pub fn node(&self, state: &S) -> Option<&SolutionNode<S>> {
        self.nodes.iter().find(|n| n.state == *state)
    }

    /// Nodes without children (the goal occurrences).
    pub fn leaves(&self) -> impl Iterator<Item = &SolutionNode<S>> {
        self.nodes.iter().filter(|n| n.children.is_empty())
    }
}

/// Recorded best branch: its index, and the chosen child for OR branches.
#[derive(Debug, Clone, Copy)]
struct BestBranch {
    branch: usize,
    chosen: Option<usize>,
}

/// Memoizing AO* evaluator over one graph and goal.
///
/// The evaluator keeps its discovery worklist, tentative costs and priority
/// queue between calls, so repeated queries share work. It is owned by one
/// caller; independent searches need independent evaluators.
#[derive(Debug)]
pub struct AoStar<'g, S> {
    graph: &'g AndOrGraph<S>,
    goal: usize,
    cost: Vec<Cost>,
    solved: Vec<bool>,
    discovered: Vec<bool>,
    best: Vec<Option<BestBranch>>,
    parents: Vec<Vec<(usize, usize)>>,
    unsolved_children: Vec<Vec<usize>>,
    worklist: Vec<usize>,
    queue: BinaryHeap<Reverse<(Cost, usize)>>,
    stats: SearchStats,
}

impl<'g, S: Clone + Eq + Hash + Debug> AoStar<'g, S> {
    /// Evaluator for `graph` with `goal` as the only terminal node.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownGoal`] when `goal` is not in the graph.
    pub fn new(graph: &'g AndOrGraph<S>, goal: &S) -> Result<Self, ModelError> {
        let goal = graph.node(goal).ok_or_else(|| ModelError::unknown_goal(goal))?;
        let n = graph.len();
        Ok(Self {
            graph,
            goal,
            cost: vec![Cost::INFINITY; n],
            solved: vec![false; n],
            discovered: vec![false; n],
            best: vec![None; n],
            parents: vec![Vec::new(); n],
            unsolved_children: vec![Vec::new(); n],
            worklist: Vec::new(),
            queue: BinaryHeap::new(),
            stats: SearchStats::default(),
        })
    }

    /// Cost of `state`: finite when solved, +inf when it cannot be solved.
    ///
    /// A solved state returns its memoized cost without any expansion.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownStart`] when `state` is not in the graph.
    pub fn cost_of(&mut self, state: &S) -> Result<Cost, ModelError> {
        let node = self
            .graph
            .node(state)
            .ok_or_else(|| ModelError::unknown_start(state))?;
        let unbounded = SearchPolicyV1::unbounded();
        // An unbounded meter never trips.
        let _ = self.evaluate(node, &BudgetMeter::start(&unbounded));
        Ok(self.cost[node])
    }

    #[must_use]
    pub fn is_solved(&self, state: &S) -> bool {
        self.graph.node(state).is_some_and(|n| self.solved[n])
    }

    /// Nodes expanded so far, over the evaluator's whole lifetime.
    #[must_use]
    pub fn expansions(&self) -> u64 {
        self.stats.expansions
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Walk best branches from `start`. `None` unless `start` is solved.
    #[must_use]
    pub fn solution_graph(&self, start: &S) -> Option<SolutionGraph<S>> {
        let root = self.graph.node(start).filter(|&n| self.solved[n])?;
        let mut nodes = Vec::new();
        let mut seen = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(n) = queue.pop_front() {
            let (kind, children) = if n == self.goal {
                (None, Vec::new())
            } else {
                let best = self.best[n]?;
                let branch = &self.graph.branches(n)[best.branch];
                let mut children = match best.chosen {
                    Some(child) => vec![child],
                    None => branch.children.clone(),
                };
                let mut unique = HashSet::new();
                children.retain(|c| unique.insert(*c));
                (Some(branch.kind), children)
            };
            for &child in &children {
                if seen.insert(child) {
                    queue.push_back(child);
                }
            }
            nodes.push(SolutionNode {
                state: self.graph.state(n).clone(),
                cost: self.cost[n],
                kind,
                children: children.iter().map(|&c| self.graph.state(c).clone()).collect(),
            });
        }
        Some(SolutionGraph {
            root: start.clone(),
            cost: self.cost[root],
            nodes,
        })
    }

    /// Discover everything below `node`, then settle until `node` is solved
    /// or nothing is left to settle.
    fn evaluate(&mut self, node: usize, meter: &BudgetMeter<'_>) -> Result<(), Budget> {
        if self.solved[node] {
            return Ok(());
        }
        if !self.discovered[node] {
            self.discovered[node] = true;
            self.stats.generated += 1;
            self.worklist.push(node);
        }

        while let Some(&n) = self.worklist.last() {
            if let Some(budget) = meter.exhausted(&self.stats) {
                return Err(budget);
            }
            self.worklist.pop();
            self.expand(n);
        }

        while !self.solved[node] {
            if let Some(budget) = meter.exhausted(&self.stats) {
                return Err(budget);
            }
            let Some(Reverse((cost, n))) = self.queue.pop() else {
                break;
            };
            if self.solved[n] || cost > self.cost[n] {
                self.stats.stale_pops += 1;
                continue;
            }
            self.settle(n);
        }
        Ok(())
    }

    fn expand(&mut self, n: usize) {
        self.stats.expansions += 1;
        if n == self.goal {
            self.improve(n, Cost::ZERO, None);
            return;
        }
        let graph = self.graph;
        let branches = graph.branches(n);
        self.unsolved_children[n] = branches.iter().map(|b| b.children.len()).collect();
        for (b, branch) in branches.iter().enumerate() {
            for &child in &branch.children {
                self.parents[child].push((n, b));
                if self.solved[child] {
                    self.child_solved(n, b, child);
                } else if !self.discovered[child] {
                    self.discovered[child] = true;
                    self.stats.generated += 1;
                    self.worklist.push(child);
                } else {
                    self.stats.duplicates_suppressed += 1;
                }
            }
        }
    }

    fn settle(&mut self, n: usize) {
        self.solved[n] = true;
        tracing::trace!(state = ?self.graph.state(n), cost = self.cost[n].value(), "ao* settle");
        for i in 0..self.parents[n].len() {
            let (parent, branch) = self.parents[n][i];
            self.child_solved(parent, branch, n);
        }
    }

    /// `child` of branch `b` of `parent` has its final cost.
    fn child_solved(&mut self, parent: usize, b: usize, child: usize) {
        if self.solved[parent] {
            return;
        }
        let graph = self.graph;
        let branch = &graph.branches(parent)[b];
        match branch.kind {
            BranchKind::Or => {
                let candidate = self.cost[child] + Cost::ONE;
                self.improve(
                    parent,
                    candidate,
                    Some(BestBranch {
                        branch: b,
                        chosen: Some(child),
                    }),
                );
            }
            BranchKind::And => {
                let remaining = &mut self.unsolved_children[parent][b];
                *remaining -= 1;
                if *remaining == 0 {
                    let members: Cost = branch.children.iter().map(|&c| self.cost[c]).sum();
                    let candidate = members + Cost::from(branch.children.len() as f64);
                    self.improve(
                        parent,
                        candidate,
                        Some(BestBranch {
                            branch: b,
                            chosen: None,
                        }),
                    );
                }
            }
        }
    }

    fn improve(&mut self, n: usize, candidate: Cost, best: Option<BestBranch>) {
        if candidate < self.cost[n] {
            self.cost[n] = candidate;
            self.best[n] = best;
            self.queue.push(Reverse((candidate, n)));
            self.stats.observe_frontier(self.queue.len());
        }
    }
}

/// Solve `start` in an AND-OR graph and return its solution graph.
///
/// # Errors
///
/// [`SearchError::InvalidPolicy`] for degenerate budgets;
/// [`SearchError::InvalidModel`] when `start` or `goal` is not in the graph.
pub fn ao_star<S: Clone + Eq + Hash + Debug>(
    graph: &AndOrGraph<S>,
    start: &S,
    goal: &S,
    policy: &SearchPolicyV1,
) -> Result<SearchRun<SolutionGraph<S>>, SearchError> {
    policy.validate()?;
    let root = graph.node(start).ok_or_else(|| ModelError::unknown_start(start))?;
    let mut evaluator = AoStar::new(graph, goal)?;

    let meter = BudgetMeter::start(policy);
    let outcome = match evaluator.evaluate(root, &meter) {
        Err(budget) => Outcome::ResourceExhausted(budget),
        Ok(()) => match evaluator.solution_graph(start) {
            Some(solution) => Outcome::Solved(solution),
            None => Outcome::NoSolution,
        },
    };
    tracing::debug!(
        algorithm = "ao_star",
        solved = outcome.is_solved(),
        expansions = evaluator.stats.expansions,
        "search finished"
    );
    Ok(SearchRun {
        outcome,
        stats: evaluator.stats.clone(),
        trace: Vec::new(),
    })
}
