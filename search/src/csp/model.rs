//! CSP model: variables, domains, constraints, and (partial) assignments.

use std::collections::HashMap;
use std::fmt;

use crate::csp::constraint::Constraint;
use crate::error::ModelError;

/// Handle of a CSP variable, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Values for some of the variables, with the order they were assigned in.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialAssignment<V> {
    values: Vec<Option<V>>,
    order: Vec<VarId>,
}

impl<V> PartialAssignment<V> {
    /// Empty assignment over `len` variables.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            values: std::iter::repeat_with(|| None).take(len).collect(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, var: VarId) -> Option<&V> {
        self.values.get(var.0).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_assigned(&self, var: VarId) -> bool {
        self.get(var).is_some()
    }

    /// Assign `var`, replacing any previous value.
    pub fn assign(&mut self, var: VarId, value: V) {
        if self.values[var.0].replace(value).is_none() {
            self.order.push(var);
        }
    }

    /// Remove the value of `var`, returning it.
    pub fn unassign(&mut self, var: VarId) -> Option<V> {
        let old = self.values[var.0].take();
        if old.is_some() {
            if let Some(pos) = self.order.iter().rposition(|&v| v == var) {
                self.order.remove(pos);
            }
        }
        old
    }

    /// Position of `var` in assignment order (0 = assigned first).
    #[must_use]
    pub fn depth_of(&self, var: VarId) -> Option<usize> {
        self.order.iter().position(|&v| v == var)
    }

    /// Assigned variables, oldest first.
    #[must_use]
    pub fn order(&self) -> &[VarId] {
        &self.order
    }

    /// Number of assigned variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.order.len() == self.values.len()
    }
}

/// A complete assignment returned by the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<V> {
    names: Vec<String>,
    values: Vec<V>,
}

impl<V> Assignment<V> {
    pub(crate) fn new(names: Vec<String>, values: Vec<V>) -> Self {
        Self { names, values }
    }

    #[must_use]
    pub fn get(&self, var: VarId) -> &V {
        &self.values[var.0]
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&V> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether this assignment satisfies every constraint of `csp`.
    #[must_use]
    pub fn satisfies(&self, csp: &Csp<V>) -> bool
    where
        V: Clone + PartialEq,
    {
        if self.values.len() != csp.len() {
            return false;
        }
        let mut partial = PartialAssignment::new(self.values.len());
        for (i, value) in self.values.iter().enumerate() {
            if !csp.domain(VarId(i)).contains(value) {
                return false;
            }
            partial.assign(VarId(i), value.clone());
        }
        csp.constraints().all(|c| c.is_consistent(&partial))
    }
}

/// A constraint satisfaction problem: named variables with finite ordered
/// domains, and constraints over them.
pub struct Csp<V> {
    names: Vec<String>,
    domains: Vec<Vec<V>>,
    index: HashMap<String, VarId>,
    constraints: Vec<Box<dyn Constraint<V>>>,
    /// Constraint indices per variable.
    by_var: Vec<Vec<usize>>,
}

impl<V: PartialEq> Csp<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            domains: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            by_var: Vec::new(),
        }
    }

    /// Declare a variable with an ordered domain.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateVariable`] when `name` is already declared.
    /// Empty domains are accepted here and rejected by [`Csp::validate`].
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        domain: impl IntoIterator<Item = V>,
    ) -> Result<VarId, ModelError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ModelError::DuplicateVariable { name });
        }
        let var = VarId(self.names.len());
        self.index.insert(name.clone(), var);
        self.names.push(name);
        self.domains.push(domain.into_iter().collect());
        self.by_var.push(Vec::new());
        Ok(var)
    }

    /// Add a constraint.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptyScope`] for a constraint without variables;
    /// [`ModelError::UnknownVariable`] when the scope names a variable that
    /// was not declared on this problem.
    pub fn add_constraint<C>(&mut self, constraint: C) -> Result<(), ModelError>
    where
        C: Constraint<V> + 'static,
    {
        let scope = constraint.scope();
        if scope.is_empty() {
            return Err(ModelError::EmptyScope {
                constraint: constraint.label(),
            });
        }
        if let Some(unknown) = scope.iter().find(|v| v.0 >= self.names.len()) {
            return Err(ModelError::UnknownVariable {
                variable: unknown.to_string(),
            });
        }
        let idx = self.constraints.len();
        let mut vars: Vec<VarId> = scope.to_vec();
        vars.sort_unstable();
        vars.dedup();
        for var in vars {
            self.by_var[var.0].push(idx);
        }
        self.constraints.push(Box::new(constraint));
        Ok(())
    }

    /// Reject models that cannot be searched.
    ///
    /// # Errors
    ///
    /// [`ModelError::EmptyDomain`] for the first variable without values.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(i) = self.domains.iter().position(Vec::is_empty) {
            return Err(ModelError::EmptyDomain {
                variable: self.names[i].clone(),
            });
        }
        Ok(())
    }
}

impl<V> Csp<V> {
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, var: VarId) -> &str {
        &self.names[var.0]
    }

    #[must_use]
    pub fn domain(&self, var: VarId) -> &[V] {
        &self.domains[var.0]
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = VarId> {
        (0..self.names.len()).map(VarId)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &(dyn Constraint<V> + 'static)> {
        self.constraints.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Constraints whose scope contains `var`.
    pub fn constraints_on(&self, var: VarId) -> impl Iterator<Item = &(dyn Constraint<V> + 'static)> {
        self.by_var[var.0]
            .iter()
            .map(|&i| self.constraints[i].as_ref())
    }

    /// Variables sharing at least one constraint with `var`, ascending.
    #[must_use]
    pub fn neighbors(&self, var: VarId) -> Vec<VarId> {
        let mut out: Vec<VarId> = self
            .constraints_on(var)
            .flat_map(|c| c.scope().iter().copied())
            .filter(|&v| v != var)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }
}

impl<V: PartialEq> Default for Csp<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Csp<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constraints: Vec<String> = self.constraints.iter().map(|c| c.label()).collect();
        f.debug_struct("Csp")
            .field("names", &self.names)
            .field("domains", &self.domains)
            .field("constraints", &constraints)
            .finish()
    }
}
