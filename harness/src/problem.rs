//! Problem files: the JSON documents the harness runs.
//!
//! Three schemas are recognised, selected by the `schema_version` field:
//!
//! | `schema_version`    | Type             | Engine model                |
//! |---------------------|------------------|-----------------------------|
//! | `graph_problem.v1`  | [`GraphProblemV1`] | `AdjacencyGraph<String>` + `HeuristicTable` |
//! | `and_or_problem.v1` | [`AndOrProblemV1`] | `AndOrGraph<String>`        |
//! | `csp_problem.v1`    | [`CspProblemV1`]   | `Csp<serde_json::Value>`    |
//!
//! Any other version is rejected. Unknown fields are rejected too, so a typo
//! in a field name never silently falls back to a default.
//!
//! The canonical bytes of a problem (see [`ProblemV1::canonical_bytes`]) are
//! what the harness stores as `problem.json` and hashes into the run
//! report's `problem_digest`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use wayfind_kernel::canon::{canonical_json_bytes, CanonError};
use wayfind_kernel::hash::{canonical_hash, ContentHash, HashDomain};
use wayfind_search::csp::{AllDifferent, AllowedPairs, Csp, Equal, NotEqual, VarId};
use wayfind_search::{AdjacencyGraph, AndOrGraph, BranchKind, HeuristicTable, ModelError};

pub const GRAPH_PROBLEM_SCHEMA: &str = "graph_problem.v1";
pub const AND_OR_PROBLEM_SCHEMA: &str = "and_or_problem.v1";
pub const CSP_PROBLEM_SCHEMA: &str = "csp_problem.v1";

/// Error loading or building a problem.
#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("problem is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("problem has no string \"schema_version\"")]
    MissingSchemaVersion,
    #[error("unsupported schema_version {found:?}")]
    UnsupportedSchema { found: String },
    #[error("expected a {expected} problem, found {found}")]
    KindMismatch {
        expected: ProblemKind,
        found: ProblemKind,
    },
    #[error("constraint #{index} ({kind}): {detail}")]
    InvalidConstraint {
        index: usize,
        kind: ConstraintKind,
        detail: String,
    },
    #[error("constraint #{index} names unknown variable {name:?}")]
    UnknownVariable { index: usize, name: String },
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("canonical JSON: {0}")]
    Canon(#[from] CanonError),
}

/// The three problem families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    Graph,
    AndOr,
    Csp,
}

impl ProblemKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemKind::Graph => "graph",
            ProblemKind::AndOr => "and_or",
            ProblemKind::Csp => "csp",
        }
    }

    #[must_use]
    pub fn schema_version(self) -> &'static str {
        match self {
            ProblemKind::Graph => GRAPH_PROBLEM_SCHEMA,
            ProblemKind::AndOr => AND_OR_PROBLEM_SCHEMA,
            ProblemKind::Csp => CSP_PROBLEM_SCHEMA,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// graph_problem.v1
// ---------------------------------------------------------------------------

/// Weighted graph with a start, a goal and an optional heuristic table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphProblemV1 {
    pub schema_version: String,
    pub directed: bool,
    pub edges: Vec<EdgeSpec>,
    /// Extra states with no edges. Edge endpoints never need listing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
    pub start: String,
    pub goal: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub heuristic: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    #[serde(default = "unit_cost")]
    pub cost: f64,
}

fn unit_cost() -> f64 {
    1.0
}

impl GraphProblemV1 {
    /// Empty problem of the current schema version.
    #[must_use]
    pub fn new(directed: bool, start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            schema_version: GRAPH_PROBLEM_SCHEMA.to_string(),
            directed,
            edges: Vec::new(),
            states: Vec::new(),
            start: start.into(),
            goal: goal.into(),
            heuristic: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_edge(mut self, from: impl Into<String>, to: impl Into<String>, cost: f64) -> Self {
        self.edges.push(EdgeSpec {
            from: from.into(),
            to: to.into(),
            cost,
        });
        self
    }

    /// Build the adjacency graph, in edge order.
    ///
    /// # Errors
    ///
    /// [`ProblemError::Model`] for a negative or non-finite edge cost.
    pub fn graph(&self) -> Result<AdjacencyGraph<String>, ProblemError> {
        let mut graph = if self.directed {
            AdjacencyGraph::directed()
        } else {
            AdjacencyGraph::undirected()
        };
        for state in &self.states {
            graph.add_state(state.clone());
        }
        for edge in &self.edges {
            graph.add_edge(edge.from.clone(), edge.to.clone(), edge.cost)?;
        }
        Ok(graph)
    }

    /// The heuristic table. Estimates are checked by the search when used.
    #[must_use]
    pub fn heuristic_table(&self) -> HeuristicTable<String> {
        self.heuristic
            .iter()
            .map(|(state, estimate)| (state.clone(), *estimate))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// and_or_problem.v1
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndOrProblemV1 {
    pub schema_version: String,
    pub branches: Vec<BranchSpec>,
    pub start: String,
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchSpec {
    pub node: String,
    pub kind: BranchKindSpec,
    pub children: Vec<String>,
}

/// Wire form of [`BranchKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKindSpec {
    And,
    Or,
}

impl From<BranchKindSpec> for BranchKind {
    fn from(kind: BranchKindSpec) -> Self {
        match kind {
            BranchKindSpec::And => BranchKind::And,
            BranchKindSpec::Or => BranchKind::Or,
        }
    }
}

impl AndOrProblemV1 {
    #[must_use]
    pub fn new(start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            schema_version: AND_OR_PROBLEM_SCHEMA.to_string(),
            branches: Vec::new(),
            start: start.into(),
            goal: goal.into(),
        }
    }

    #[must_use]
    pub fn with_branch<I, C>(mut self, node: impl Into<String>, kind: BranchKindSpec, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.branches.push(BranchSpec {
            node: node.into(),
            kind,
            children: children.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Build the AND-OR graph, in branch order.
    ///
    /// # Errors
    ///
    /// [`ProblemError::Model`] for a branch without children.
    pub fn graph(&self) -> Result<AndOrGraph<String>, ProblemError> {
        let mut graph = AndOrGraph::new();
        for branch in &self.branches {
            graph.add_branch(branch.node.clone(), branch.kind.into(), branch.children.iter().cloned())?;
        }
        Ok(graph)
    }
}

// ---------------------------------------------------------------------------
// csp_problem.v1
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CspProblemV1 {
    pub schema_version: String,
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub constraints: Vec<ConstraintSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableSpec {
    pub name: String,
    pub domain: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSpec {
    pub kind: ConstraintKind,
    pub vars: Vec<String>,
    /// Allowed `(a, b)` tuples; only meaningful for `allowed_pairs`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<(Value, Value)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    NotEqual,
    Equal,
    AllDifferent,
    AllowedPairs,
}

impl ConstraintKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::NotEqual => "not_equal",
            ConstraintKind::Equal => "equal",
            ConstraintKind::AllDifferent => "all_different",
            ConstraintKind::AllowedPairs => "allowed_pairs",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CspProblemV1 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_version: CSP_PROBLEM_SCHEMA.to_string(),
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_variable<I, T>(mut self, name: impl Into<String>, domain: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.variables.push(VariableSpec {
            name: name.into(),
            domain: domain.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn with_constraint<I, N>(mut self, kind: ConstraintKind, vars: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.constraints.push(ConstraintSpec {
            kind,
            vars: vars.into_iter().map(Into::into).collect(),
            pairs: Vec::new(),
        });
        self
    }

    #[must_use]
    pub fn with_allowed_pairs<P, T>(mut self, a: impl Into<String>, b: impl Into<String>, pairs: P) -> Self
    where
        P: IntoIterator<Item = (T, T)>,
        T: Into<Value>,
    {
        self.constraints.push(ConstraintSpec {
            kind: ConstraintKind::AllowedPairs,
            vars: vec![a.into(), b.into()],
            pairs: pairs.into_iter().map(|(x, y)| (x.into(), y.into())).collect(),
        });
        self
    }

    /// Build the engine model.
    ///
    /// # Errors
    ///
    /// - [`ProblemError::Model`] for duplicate variable names or empty domains
    /// - [`ProblemError::UnknownVariable`] when a constraint names an
    ///   undeclared variable
    /// - [`ProblemError::InvalidConstraint`] for a wrong arity or `pairs` on
    ///   a kind other than `allowed_pairs`
    pub fn csp(&self) -> Result<Csp<Value>, ProblemError> {
        let mut csp = Csp::new();
        for variable in &self.variables {
            csp.add_variable(variable.name.clone(), variable.domain.clone())?;
        }
        for (index, entry) in self.constraints.iter().enumerate() {
            let vars = entry
                .vars
                .iter()
                .map(|name| {
                    csp.variable(name).ok_or_else(|| ProblemError::UnknownVariable {
                        index,
                        name: name.clone(),
                    })
                })
                .collect::<Result<Vec<VarId>, _>>()?;
            let invalid = |detail: &str| ProblemError::InvalidConstraint {
                index,
                kind: entry.kind,
                detail: detail.to_string(),
            };
            if entry.kind != ConstraintKind::AllowedPairs && !entry.pairs.is_empty() {
                return Err(invalid("\"pairs\" only applies to allowed_pairs"));
            }
            match (entry.kind, vars.as_slice()) {
                (ConstraintKind::NotEqual, &[a, b]) => csp.add_constraint(NotEqual::new(a, b))?,
                (ConstraintKind::Equal, &[a, b]) => csp.add_constraint(Equal::new(a, b))?,
                (ConstraintKind::AllowedPairs, &[a, b]) => {
                    csp.add_constraint(AllowedPairs::new(a, b, entry.pairs.iter().cloned()))?;
                }
                (ConstraintKind::AllDifferent, vars) if !vars.is_empty() => {
                    csp.add_constraint(AllDifferent::new(vars.iter().copied()))?;
                }
                (ConstraintKind::AllDifferent, _) => return Err(invalid("needs at least one variable")),
                _ => return Err(invalid("needs exactly two variables")),
            }
        }
        csp.validate()?;
        Ok(csp)
    }
}

impl Default for CspProblemV1 {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Any supported problem file.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemV1 {
    Graph(GraphProblemV1),
    AndOr(AndOrProblemV1),
    Csp(CspProblemV1),
}

impl ProblemV1 {
    /// Parse a problem file, dispatching on `schema_version`.
    ///
    /// # Errors
    ///
    /// [`ProblemError::UnsupportedSchema`] for an unknown version, or
    /// [`ProblemError::Json`] when the document does not match its schema.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProblemError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// As [`ProblemV1::from_json`], from an already-parsed value.
    ///
    /// # Errors
    ///
    /// See [`ProblemV1::from_json`].
    pub fn from_value(value: Value) -> Result<Self, ProblemError> {
        let version = value
            .get("schema_version")
            .and_then(Value::as_str)
            .ok_or(ProblemError::MissingSchemaVersion)?;
        match version {
            GRAPH_PROBLEM_SCHEMA => Ok(Self::Graph(serde_json::from_value(value)?)),
            AND_OR_PROBLEM_SCHEMA => Ok(Self::AndOr(serde_json::from_value(value)?)),
            CSP_PROBLEM_SCHEMA => Ok(Self::Csp(serde_json::from_value(value)?)),
            other => Err(ProblemError::UnsupportedSchema {
                found: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ProblemKind {
        match self {
            ProblemV1::Graph(_) => ProblemKind::Graph,
            ProblemV1::AndOr(_) => ProblemKind::AndOr,
            ProblemV1::Csp(_) => ProblemKind::Csp,
        }
    }

    /// Fail unless this problem is of `expected` kind.
    ///
    /// # Errors
    ///
    /// [`ProblemError::KindMismatch`].
    pub fn expect_kind(&self, expected: ProblemKind) -> Result<(), ProblemError> {
        let found = self.kind();
        if found == expected {
            Ok(())
        } else {
            Err(ProblemError::KindMismatch { expected, found })
        }
    }

    /// Structured value of the problem.
    ///
    /// # Errors
    ///
    /// [`ProblemError::Json`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, ProblemError> {
        let value = match self {
            ProblemV1::Graph(p) => serde_json::to_value(p)?,
            ProblemV1::AndOr(p) => serde_json::to_value(p)?,
            ProblemV1::Csp(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Canonical JSON bytes: sorted keys, no whitespace, empty optional
    /// fields omitted.
    ///
    /// # Errors
    ///
    /// [`ProblemError::Canon`] for a non-finite number.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, ProblemError> {
        Ok(canonical_json_bytes(&self.to_value()?)?)
    }

    /// `ProblemSnapshot` hash of the canonical bytes.
    ///
    /// # Errors
    ///
    /// See [`ProblemV1::canonical_bytes`].
    pub fn digest(&self) -> Result<ContentHash, ProblemError> {
        Ok(canonical_hash(HashDomain::ProblemSnapshot, &self.canonical_bytes()?))
    }
}

impl From<GraphProblemV1> for ProblemV1 {
    fn from(problem: GraphProblemV1) -> Self {
        Self::Graph(problem)
    }
}

impl From<AndOrProblemV1> for ProblemV1 {
    fn from(problem: AndOrProblemV1) -> Self {
        Self::AndOr(problem)
    }
}

impl From<CspProblemV1> for ProblemV1 {
    fn from(problem: CspProblemV1) -> Self {
        Self::Csp(problem)
    }
}
