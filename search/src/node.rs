//! Search nodes, the per-call node arena, and the frontier ordering key.

use crate::cost::Cost;

/// A node generated during graph search.
///
/// Nodes live in a [`NodeArena`] owned by one search call; `parent_id` is an
/// index into that arena, so path reconstruction never follows references.
#[derive(Debug, Clone)]
pub struct SearchNode<S> {
    /// Arena index, assigned in generation order.
    pub node_id: usize,
    /// Parent node index (`None` for the root).
    pub parent_id: Option<usize>,
    pub state: S,
    /// Tree depth (root = 0).
    pub depth: u32,
    /// Accumulated path cost from the root.
    pub g_cost: Cost,
    /// Heuristic estimate (zero for uninformed search).
    pub h_cost: Cost,
}

impl<S> SearchNode<S> {
    /// `f_cost = g_cost + h_cost`.
    #[must_use]
    pub fn f_cost(&self) -> Cost {
        self.g_cost + self.h_cost
    }
}

/// Append-only node storage for one search call.
#[derive(Debug, Clone)]
pub struct NodeArena<S> {
    nodes: Vec<SearchNode<S>>,
}

impl<S: Clone> NodeArena<S> {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate the root node (depth 0, `g = 0`).
    pub fn push_root(&mut self, state: S, h_cost: Cost) -> usize {
        self.push(None, state, 0, Cost::ZERO, h_cost)
    }

    /// Allocate a child of `parent_id` reached over an edge of `edge_cost`.
    pub fn push_child(
        &mut self,
        parent_id: usize,
        state: S,
        edge_cost: Cost,
        h_cost: Cost,
    ) -> usize {
        let parent = &self.nodes[parent_id];
        let depth = parent.depth + 1;
        let g_cost = parent.g_cost + edge_cost;
        self.push(Some(parent_id), state, depth, g_cost, h_cost)
    }

    fn push(
        &mut self,
        parent_id: Option<usize>,
        state: S,
        depth: u32,
        g_cost: Cost,
        h_cost: Cost,
    ) -> usize {
        let node_id = self.nodes.len();
        self.nodes.push(SearchNode {
            node_id,
            parent_id,
            state,
            depth,
            g_cost,
            h_cost,
        });
        node_id
    }

    #[must_use]
    pub fn get(&self, node_id: usize) -> &SearchNode<S> {
        &self.nodes[node_id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `state` occurs on the path from the root to `node_id`.
    #[must_use]
    pub fn on_path(&self, node_id: usize, state: &S) -> bool
    where
        S: PartialEq,
    {
        let mut current = Some(node_id);
        while let Some(id) = current {
            let node = &self.nodes[id];
            if node.state == *state {
                return true;
            }
            current = node.parent_id;
        }
        false
    }

    /// Reconstruct the state path from the root to `node_id`.
    #[must_use]
    pub fn path_to(&self, node_id: usize) -> Vec<S> {
        let mut path = Vec::with_capacity(self.nodes[node_id].depth as usize + 1);
        let mut current = Some(node_id);
        while let Some(id) = current {
            let node = &self.nodes[id];
            path.push(node.state.clone());
            current = node.parent_id;
        }
        path.reverse();
        path
    }
}

impl<S: Clone> Default for NodeArena<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// The priority-frontier ordering key: `(primary, secondary, creation_order)`.
///
/// Lower is better on every component. Best-first strategies choose what
/// `primary` and `secondary` hold:
///
/// | strategy | primary | secondary |
/// |----------|---------|-----------|
/// | UCS      | g       | 0         |
/// | A*       | f = g+h | h         |
/// | greedy   | h       | g         |
///
/// For A* this means equal-f ties go to the node with the smaller h (the
/// larger g, i.e. the one closer to a goal), then to the older entry (FIFO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrontierKey {
    pub primary: Cost,
    pub secondary: Cost,
    pub creation_order: u64,
}
