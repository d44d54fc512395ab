//! Wayfind Search: graph search, AND-OR search, and constraint satisfaction.
//!
//! This crate is the engine. It depends on no other workspace crate; the
//! harness layers problem files, reports and bundles on top of it.
//!
//! # Crate dependency graph
//!
//! ```text
//! wayfind_kernel        wayfind_search
//! (canon, hashing)      (graphs, frontiers, A*, AO*, CSP)
//!        ^                     ^
//!        +---- wayfind_harness-+
//!              (problems, runner, bundles, worlds, CLI)
//! ```
//!
//! # Entry points
//!
//! - [`search`] / [`bfs`] / [`ucs`] / [`dfs`] / [`iddfs`] /
//!   [`bidirectional`]: uninformed path search over a [`StateSpace`]
//! - [`a_star`] / [`greedy_best_first`]: informed path search with a
//!   [`Heuristic`]
//! - [`ao_star`] / [`AoStar`]: AND-OR graphs
//! - [`csp::solve`]: backtracking with conflict-directed backjumping
//!
//! Every entry point takes a [`SearchPolicyV1`] and returns
//! `Result<SearchRun<..>, SearchError>`. `Err` means the input was malformed;
//! "no solution" and "budget exhausted" are [`Outcome`] values.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod and_or;
mod best_first;
pub mod cost;
pub mod csp;
pub mod error;
pub mod frontier;
pub mod informed;
pub mod model;
pub mod node;
pub mod outcome;
pub mod policy;
pub mod uninformed;

pub use and_or::{ao_star, AndOrGraph, AoStar, BranchKind, SolutionGraph, SolutionNode};
pub use cost::Cost;
pub use error::{ModelError, SearchError};
pub use informed::{a_star, greedy_best_first};
pub use model::{AdjacencyGraph, Heuristic, HeuristicTable, StateSpace, ZeroHeuristic};
pub use outcome::{Budget, ExpandEvent, Outcome, PathRun, PathSolution, SearchRun, SearchStats};
pub use policy::SearchPolicyV1;
pub use uninformed::{bfs, bidirectional, dfs, iddfs, search, ucs, Strategy, UnknownStrategy};
