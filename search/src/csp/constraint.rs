//! The constraint interface and the built-in constraint kinds.

use crate::csp::model::{PartialAssignment, VarId};

/// A constraint over a fixed scope of variables.
///
/// `is_consistent` sees a partial assignment. It must return `true` while
/// the assigned part of its scope can still be extended to a satisfying
/// tuple as far as the constraint can tell; the usual implementation only
/// rejects once every variable it compares is assigned.
pub trait Constraint<V> {
    fn scope(&self) -> &[VarId];

    fn is_consistent(&self, assignment: &PartialAssignment<V>) -> bool;

    /// Human-readable name used in errors and traces.
    fn label(&self) -> String {
        format!("constraint over {:?}", self.scope())
    }
}

/// `a != b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotEqual {
    scope: [VarId; 2],
}

impl NotEqual {
    #[must_use]
    pub fn new(a: VarId, b: VarId) -> Self {
        Self { scope: [a, b] }
    }
}

impl<V: PartialEq> Constraint<V> for NotEqual {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn is_consistent(&self, assignment: &PartialAssignment<V>) -> bool {
        match (assignment.get(self.scope[0]), assignment.get(self.scope[1])) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }

    fn label(&self) -> String {
        format!("{} != {}", self.scope[0], self.scope[1])
    }
}

/// `a == b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equal {
    scope: [VarId; 2],
}

impl Equal {
    #[must_use]
    pub fn new(a: VarId, b: VarId) -> Self {
        Self { scope: [a, b] }
    }
}

impl<V: PartialEq> Constraint<V> for Equal {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn is_consistent(&self, assignment: &PartialAssignment<V>) -> bool {
        match (assignment.get(self.scope[0]), assignment.get(self.scope[1])) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    fn label(&self) -> String {
        format!("{} == {}", self.scope[0], self.scope[1])
    }
}

/// Every assigned variable of the scope takes a distinct value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllDifferent {
    scope: Vec<VarId>,
}

impl AllDifferent {
    pub fn new(scope: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            scope: scope.into_iter().collect(),
        }
    }
}

impl<V: PartialEq> Constraint<V> for AllDifferent {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn is_consistent(&self, assignment: &PartialAssignment<V>) -> bool {
        let values: Vec<&V> = self.scope.iter().filter_map(|&v| assignment.get(v)).collect();
        values
            .iter()
            .enumerate()
            .all(|(i, a)| values[i + 1..].iter().all(|b| a != b))
    }

    fn label(&self) -> String {
        format!("all_different{:?}", self.scope)
    }
}

/// Table constraint: `(a, b)` must be one of the listed pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedPairs<V> {
    scope: [VarId; 2],
    pairs: Vec<(V, V)>,
}

impl<V> AllowedPairs<V> {
    pub fn new(a: VarId, b: VarId, pairs: impl IntoIterator<Item = (V, V)>) -> Self {
        Self {
            scope: [a, b],
            pairs: pairs.into_iter().collect(),
        }
    }
}

impl<V: PartialEq> Constraint<V> for AllowedPairs<V> {
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn is_consistent(&self, assignment: &PartialAssignment<V>) -> bool {
        match (assignment.get(self.scope[0]), assignment.get(self.scope[1])) {
            (Some(a), Some(b)) => self.pairs.iter().any(|(x, y)| x == a && y == b),
            _ => true,
        }
    }

    fn label(&self) -> String {
        format!("allowed_pairs({}, {})", self.scope[0], self.scope[1])
    }
}

/// Binary constraint given by a predicate over the two values.
pub struct BinaryPredicate<F> {
    scope: [VarId; 2],
    name: String,
    predicate: F,
}

impl<F> BinaryPredicate<F> {
    pub fn new(a: VarId, b: VarId, name: impl Into<String>, predicate: F) -> Self {
        Self {
            scope: [a, b],
            name: name.into(),
            predicate,
        }
    }
}

impl<F> std::fmt::Debug for BinaryPredicate<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryPredicate")
            .field("scope", &self.scope)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<V, F> Constraint<V> for BinaryPredicate<F>
where
    F: Fn(&V, &V) -> bool,
{
    fn scope(&self) -> &[VarId] {
        &self.scope
    }

    fn is_consistent(&self, assignment: &PartialAssignment<V>) -> bool {
        match (assignment.get(self.scope[0]), assignment.get(self.scope[1])) {
            (Some(a), Some(b)) => (self.predicate)(a, b),
            _ => true,
        }
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
