//! Constraint satisfaction: the model and the backtracking solver.

pub mod constraint;
pub mod model;
pub mod solver;

pub use constraint::{AllDifferent, AllowedPairs, BinaryPredicate, Constraint, Equal, NotEqual};
pub use model::{Assignment, Csp, PartialAssignment, VarId};
pub use solver::{solve, Backtracking, CspEvent, CspOptions, ValueOrder, VariableOrder};
