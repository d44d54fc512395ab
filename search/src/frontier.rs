//! Frontier structures: FIFO queue, LIFO stack, and min-priority queue.
//!
//! Frontiers hold arena node ids, never nodes: the arena owns the nodes and
//! the frontier only decides the order in which they are expanded.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::cost::Cost;
use crate::node::FrontierKey;

/// Ordering discipline over pending node ids.
pub trait Frontier {
    fn push(&mut self, node_id: usize);
    fn pop(&mut self) -> Option<usize>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First-in first-out frontier (breadth-first order).
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<usize>,
}

impl FifoFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for FifoFrontier {
    fn push(&mut self, node_id: usize) {
        self.queue.push_back(node_id);
    }

    fn pop(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Last-in first-out frontier (depth-first order).
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<usize>,
}

impl LifoFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for LifoFrontier {
    fn push(&mut self, node_id: usize) {
        self.stack.push(node_id);
    }

    fn pop(&mut self) -> Option<usize> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

/// A frontier entry wrapping a node id with its ordering key.
///
/// `BinaryHeap` is a max-heap, so we use `Reverse<FrontierKey>` to get
/// min-heap behavior (lowest key first).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    node_id: usize,
}

/// Min-priority frontier keyed by [`FrontierKey`].
///
/// Entries are never updated in place. A cheaper path to a state is pushed
/// as a new entry, and the caller discards superseded entries when they
/// surface (lazy deletion).
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<FrontierEntry>,
    next_creation_order: u64,
}

impl PriorityFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push with explicit primary / secondary keys. The creation order is
    /// assigned here, so equal keys pop in insertion order.
    pub fn push_keyed(&mut self, node_id: usize, primary: Cost, secondary: Cost) {
        let key = FrontierKey {
            primary,
            secondary,
            creation_order: self.next_creation_order,
        };
        self.next_creation_order += 1;
        self.heap.push(FrontierEntry {
            key: Reverse(key),
            node_id,
        });
    }

    /// Pop the entry with the lowest key, returning it with its key.
    pub fn pop_keyed(&mut self) -> Option<(usize, FrontierKey)> {
        self.heap.pop().map(|e| (e.node_id, e.key.0))
    }

    /// Key of the entry [`PriorityFrontier::pop_keyed`] would return.
    #[must_use]
    pub fn peek_key(&self) -> Option<FrontierKey> {
        self.heap.peek().map(|e| e.key.0)
    }
}

impl Frontier for PriorityFrontier {
    /// Push with a zero key: pure FIFO among such entries.
    fn push(&mut self, node_id: usize) {
        self.push_keyed(node_id, Cost::ZERO, Cost::ZERO);
    }

    fn pop(&mut self) -> Option<usize> {
        self.pop_keyed().map(|(id, _)| id)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
