//! Harness runner: executes a problem on the engine and renders the result
//! as a canonical run report.
//!
//! # Pipeline
//!
//! ```text
//! ProblemV1 → canonical_bytes() → build engine model
//!   → search / ao_star / csp::solve → report (+ trace) values
//!   → canonical_json_bytes() → RunOutput → build_bundle()
//! ```
//!
//! The runner owns no search logic. Everything in the report is derived from
//! the returned `SearchRun`, the problem bytes and the policy, so identical
//! inputs give byte-identical reports. A `time_limit` is the only input that
//! can make two runs differ.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use wayfind_kernel::canon::{canonical_json_bytes, CanonError};
use wayfind_kernel::hash::{canonical_hash, ContentHash, HashDomain};
use wayfind_search::csp::{self, Assignment, Backtracking, CspEvent, CspOptions, ValueOrder, VariableOrder};
use wayfind_search::{
    a_star, ao_star, greedy_best_first, search, Cost, ExpandEvent, Outcome, PathSolution, SearchError,
    SearchPolicyV1, SearchStats, SolutionGraph, Strategy,
};

use crate::bundle::{build_bundle, ArtifactBundleV1, BundleBuildError, PROBLEM_ARTIFACT, REPORT_ARTIFACT, TRACE_ARTIFACT};
use crate::problem::{AndOrProblemV1, CspProblemV1, GraphProblemV1, ProblemError, ProblemKind, ProblemV1};

pub const RUN_REPORT_SCHEMA: &str = "run_report.v1";
pub const SEARCH_TRACE_SCHEMA: &str = "search_trace.v1";

/// Error during a harness run.
///
/// "No solution" and "budget exhausted" are not errors; they are recorded
/// in the report's `outcome`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error("search rejected the problem: {0}")]
    Search(#[from] SearchError),
    #[error("canonical JSON: {0}")]
    Canon(#[from] CanonError),
    #[error("bundle assembly failed: {0}")]
    Bundle(#[from] BundleBuildError),
}

// ---------------------------------------------------------------------------
// Algorithm selection
// ---------------------------------------------------------------------------

/// Path-search algorithm for graph problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphAlgorithm {
    Uninformed(Strategy),
    #[default]
    AStar,
    Greedy,
}

impl GraphAlgorithm {
    pub const ALL: [GraphAlgorithm; 7] = [
        GraphAlgorithm::Uninformed(Strategy::BreadthFirst),
        GraphAlgorithm::Uninformed(Strategy::UniformCost),
        GraphAlgorithm::Uninformed(Strategy::DepthFirst),
        GraphAlgorithm::Uninformed(Strategy::IterativeDeepening),
        GraphAlgorithm::Uninformed(Strategy::Bidirectional),
        GraphAlgorithm::AStar,
        GraphAlgorithm::Greedy,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GraphAlgorithm::Uninformed(strategy) => strategy.as_str(),
            GraphAlgorithm::AStar => "a-star",
            GraphAlgorithm::Greedy => "greedy",
        }
    }
}

impl fmt::Display for GraphAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algorithm {0:?} (expected one of bfs, ucs, dfs, iddfs, bidirectional, a-star, greedy)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for GraphAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GraphAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Everything a run needs besides the problem.
///
/// Only the field for the problem's kind is consulted: `graph_algorithm`
/// for graph problems, `csp` for CSPs. AND-OR problems always use AO*.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub graph_algorithm: GraphAlgorithm,
    pub csp: CspOptions,
    pub policy: SearchPolicyV1,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Canonical bytes produced by one run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub kind: ProblemKind,
    pub algorithm: String,
    /// Report `outcome.status`: `solved`, `no_solution` or `resource_exhausted`.
    pub status: &'static str,
    /// Canonical `problem.json`.
    pub problem: Vec<u8>,
    /// Canonical `run_report.json`.
    pub report: Vec<u8>,
    /// Canonical `trace.json`, present when the policy records a trace.
    pub trace: Option<Vec<u8>>,
}

impl RunOutput {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status == "solved"
    }

    /// `RunReport`-domain hash of the report bytes. Two runs of the same
    /// problem under the same configuration agree on this digest.
    #[must_use]
    pub fn report_digest(&self) -> ContentHash {
        canonical_hash(HashDomain::RunReport, &self.report)
    }

    /// Package the run: problem and report normative, trace observational.
    ///
    /// # Errors
    ///
    /// [`BundleBuildError`] if the manifest cannot be serialized.
    pub fn to_bundle(&self) -> Result<ArtifactBundleV1, BundleBuildError> {
        let mut artifacts = vec![
            (PROBLEM_ARTIFACT.to_string(), self.problem.clone(), true),
            (REPORT_ARTIFACT.to_string(), self.report.clone(), true),
        ];
        if let Some(trace) = &self.trace {
            artifacts.push((TRACE_ARTIFACT.to_string(), trace.clone(), false));
        }
        build_bundle(artifacts)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run any problem with `config`.
///
/// # Errors
///
/// [`RunError::Problem`] when the problem cannot be turned into a model,
/// [`RunError::Search`] when the engine rejects it before or during search.
pub fn run_problem(problem: &ProblemV1, config: &RunConfig) -> Result<RunOutput, RunError> {
    let problem_bytes = problem.canonical_bytes()?;
    let problem_digest = canonical_hash(HashDomain::ProblemSnapshot, &problem_bytes);
    let policy = &config.policy;

    let body = match problem {
        ProblemV1::Graph(p) => run_graph(p, config.graph_algorithm, policy)?,
        ProblemV1::AndOr(p) => run_and_or(p, policy)?,
        ProblemV1::Csp(p) => run_csp(p, config.csp, policy)?,
    };

    let trace = if policy.record_trace {
        let value = json!({
            "events": body.events,
            "schema_version": SEARCH_TRACE_SCHEMA,
        });
        Some(canonical_json_bytes(&value)?)
    } else {
        None
    };
    let trace_digest = trace
        .as_deref()
        .map(|bytes| canonical_hash(HashDomain::SearchTrace, bytes));

    let report = json!({
        "algorithm": body.algorithm,
        "options": body.options,
        "outcome": body.outcome,
        "policy": policy_value(policy),
        "problem_digest": problem_digest.as_str(),
        "problem_kind": problem.kind().as_str(),
        "schema_version": RUN_REPORT_SCHEMA,
        "solution": body.solution,
        "stats": stats_value(&body.stats),
        "trace_digest": trace_digest.as_ref().map(ContentHash::as_str),
    });
    let report = canonical_json_bytes(&report)?;

    tracing::info!(
        kind = problem.kind().as_str(),
        algorithm = %body.algorithm,
        status = body.status,
        expansions = body.stats.expansions,
        "run finished"
    );

    Ok(RunOutput {
        kind: problem.kind(),
        algorithm: body.algorithm,
        status: body.status,
        problem: problem_bytes,
        report,
        trace,
    })
}

/// Run and package in one step.
///
/// # Errors
///
/// As [`run_problem`], plus [`RunError::Bundle`].
pub fn run_to_bundle(problem: &ProblemV1, config: &RunConfig) -> Result<ArtifactBundleV1, RunError> {
    Ok(run_problem(problem, config)?.to_bundle()?)
}

/// Report fields that depend on the problem kind.
struct RunBody {
    algorithm: String,
    options: Value,
    status: &'static str,
    outcome: Value,
    solution: Value,
    stats: SearchStats,
    events: Vec<Value>,
}

fn run_graph(problem: &GraphProblemV1, algorithm: GraphAlgorithm, policy: &SearchPolicyV1) -> Result<RunBody, RunError> {
    let graph = problem.graph()?;
    let heuristic = problem.heuristic_table();
    let run = match algorithm {
        GraphAlgorithm::Uninformed(strategy) => search(&graph, &problem.start, &problem.goal, strategy, policy)?,
        GraphAlgorithm::AStar => a_star(&graph, &problem.start, &problem.goal, &heuristic, policy)?,
        GraphAlgorithm::Greedy => greedy_best_first(&graph, &problem.start, &problem.goal, &heuristic, policy)?,
    };
    Ok(RunBody {
        algorithm: algorithm.as_str().to_string(),
        options: Value::Null,
        status: status(&run.outcome),
        outcome: outcome_value(&run.outcome),
        solution: run.solution().map_or(Value::Null, path_value),
        events: run.trace.iter().map(expand_event_value).collect(),
        stats: run.stats,
    })
}

fn run_and_or(problem: &AndOrProblemV1, policy: &SearchPolicyV1) -> Result<RunBody, RunError> {
    let graph = problem.graph()?;
    let run = ao_star(&graph, &problem.start, &problem.goal, policy)?;
    Ok(RunBody {
        algorithm: "ao-star".to_string(),
        options: Value::Null,
        status: status(&run.outcome),
        outcome: outcome_value(&run.outcome),
        solution: run.solution().map_or(Value::Null, solution_graph_value),
        events: Vec::new(),
        stats: run.stats,
    })
}

fn run_csp(problem: &CspProblemV1, options: CspOptions, policy: &SearchPolicyV1) -> Result<RunBody, RunError> {
    let model = problem.csp()?;
    let run = csp::solve(&model, options, policy)?;
    let name = |var| model.name(var).to_string();
    let events = run
        .trace
        .iter()
        .map(|event| match event {
            CspEvent::Assign { var, value, depth } => json!({
                "depth": depth,
                "event": "assign",
                "value": value,
                "var": name(*var),
            }),
            CspEvent::Reject { var, value, culprits } => json!({
                "culprits": culprits.iter().map(|c| name(*c)).collect::<Vec<_>>(),
                "event": "reject",
                "value": value,
                "var": name(*var),
            }),
            CspEvent::Backtrack {
                from,
                to,
                levels_skipped,
            } => json!({
                "event": "backtrack",
                "from": name(*from),
                "levels_skipped": levels_skipped,
                "to": to.map(name),
            }),
        })
        .collect();
    Ok(RunBody {
        algorithm: csp_algorithm_name(options).to_string(),
        options: csp_options_value(options),
        status: status(&run.outcome),
        outcome: outcome_value(&run.outcome),
        solution: run.solution().map_or(Value::Null, assignment_value),
        events,
        stats: run.stats,
    })
}

// ---------------------------------------------------------------------------
// Report values
// ---------------------------------------------------------------------------

fn csp_algorithm_name(options: CspOptions) -> &'static str {
    match options.backtracking {
        Backtracking::ConflictDirected => "cbj",
        Backtracking::Chronological => "backtracking",
    }
}

fn csp_options_value(options: CspOptions) -> Value {
    json!({
        "value_order": match options.value_order {
            ValueOrder::Lcv => "lcv",
            ValueOrder::Domain => "domain",
        },
        "variable_order": match options.variable_order {
            VariableOrder::Mrv => "mrv",
            VariableOrder::Static => "static",
        },
    })
}

fn status<T>(outcome: &Outcome<T>) -> &'static str {
    match outcome {
        Outcome::Solved(_) => "solved",
        Outcome::NoSolution => "no_solution",
        Outcome::ResourceExhausted(_) => "resource_exhausted",
    }
}

fn outcome_value<T>(outcome: &Outcome<T>) -> Value {
    match outcome {
        Outcome::ResourceExhausted(budget) => json!({
            "budget": budget.as_str(),
            "status": status(outcome),
        }),
        _ => json!({ "status": status(outcome) }),
    }
}

/// Solution costs are finite; an infinite cost would fail canonicalization.
fn cost_value(cost: Cost) -> Value {
    json!(cost.value())
}

fn path_value(solution: &PathSolution<String>) -> Value {
    json!({
        "cost": cost_value(solution.cost),
        "edges": solution.len(),
        "path": solution.path,
    })
}

fn solution_graph_value(solution: &SolutionGraph<String>) -> Value {
    let nodes: Vec<Value> = solution
        .nodes
        .iter()
        .map(|node| {
            json!({
                "children": node.children,
                "cost": cost_value(node.cost),
                "kind": node.kind.map(|k| k.as_str()),
                "state": node.state,
            })
        })
        .collect();
    json!({
        "cost": cost_value(solution.cost),
        "nodes": nodes,
        "root": solution.root,
    })
}

fn assignment_value(assignment: &Assignment<Value>) -> Value {
    let values: Map<String, Value> = assignment
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    json!({ "assignment": values })
}

fn expand_event_value(event: &ExpandEvent<String>) -> Value {
    json!({
        "depth": event.depth,
        "f": cost_value(event.f_cost),
        "g": cost_value(event.g_cost),
        "node": event.node_id,
        "order": event.expansion_order,
        "parent": event.parent_id,
        "state": event.state,
    })
}

fn policy_value(policy: &SearchPolicyV1) -> Value {
    json!({
        "max_depth": policy.max_depth,
        "max_expansions": policy.max_expansions,
        "max_generated": policy.max_generated,
        "record_trace": policy.record_trace,
        "time_limit_ms": policy
            .time_limit
            .map(|limit| u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)),
    })
}

fn stats_value(stats: &SearchStats) -> Value {
    json!({
        "backjumps": stats.backjumps,
        "backtracks": stats.backtracks,
        "duplicates_suppressed": stats.duplicates_suppressed,
        "expansions": stats.expansions,
        "frontier_high_water": stats.frontier_high_water,
        "generated": stats.generated,
        "heuristic_inconsistencies": stats.heuristic_inconsistencies,
        "levels_skipped": stats.levels_skipped,
        "max_depth_reached": stats.max_depth_reached,
        "reopened": stats.reopened,
        "stale_pops": stats.stale_pops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ConstraintKind;

    fn diamond() -> ProblemV1 {
        GraphProblemV1::new(true, "A", "D")
            .with_edge("A", "B", 1.0)
            .with_edge("A", "C", 4.0)
            .with_edge("B", "D", 1.0)
            .with_edge("C", "D", 1.0)
            .into()
    }

    fn report_of(output: &RunOutput) -> Value {
        serde_json::from_slice(&output.report).unwrap()
    }

    #[test]
    fn graph_report_contains_path_and_stats() {
        let output = run_problem(&diamond(), &RunConfig::default()).unwrap();
        assert!(output.is_solved());
        assert_eq!(output.algorithm, "a-star");
        let report = report_of(&output);
        assert_eq!(report["schema_version"], RUN_REPORT_SCHEMA);
        assert_eq!(report["problem_kind"], "graph");
        assert_eq!(report["solution"]["path"], json!(["A", "B", "D"]));
        assert_eq!(report["solution"]["cost"], json!(2));
        assert_eq!(report["solution"]["edges"], json!(2));
        assert_eq!(report["outcome"], json!({"status": "solved"}));
        assert!(report["stats"]["expansions"].as_u64().unwrap() >= 2);
        assert_eq!(report["trace_digest"], Value::Null);
        assert!(output.trace.is_none());
    }

    #[test]
    fn report_binds_problem_digest() {
        let problem = diamond();
        let output = run_problem(&problem, &RunConfig::default()).unwrap();
        let report = report_of(&output);
        assert_eq!(report["problem_digest"], problem.digest().unwrap().as_str());
        assert_eq!(output.problem, problem.canonical_bytes().unwrap());
    }

    #[test]
    fn algorithm_names_round_trip() {
        for algorithm in GraphAlgorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<GraphAlgorithm>(), Ok(algorithm));
        }
        assert!("astar".parse::<GraphAlgorithm>().is_err());
    }

    #[test]
    fn every_graph_algorithm_finds_a_path() {
        let mut problem = diamond();
        if let ProblemV1::Graph(p) = &mut problem {
            p.directed = false;
        }
        for algorithm in GraphAlgorithm::ALL {
            let config = RunConfig {
                graph_algorithm: algorithm,
                ..RunConfig::default()
            };
            let output = run_problem(&problem, &config).unwrap();
            assert!(output.is_solved(), "{algorithm} failed");
            let report = report_of(&output);
            assert_eq!(report["algorithm"], algorithm.as_str());
            assert_eq!(report["solution"]["path"][0], "A");
            assert_eq!(report["solution"]["path"][2], "D");
        }
    }

    #[test]
    fn exhausted_budget_is_reported_not_raised() {
        let config = RunConfig {
            policy: SearchPolicyV1::default().with_max_expansions(1),
            ..RunConfig::default()
        };
        let output = run_problem(&diamond(), &config).unwrap();
        assert_eq!(output.status, "resource_exhausted");
        let report = report_of(&output);
        assert_eq!(report["outcome"], json!({"budget": "expansions", "status": "resource_exhausted"}));
        assert_eq!(report["solution"], Value::Null);
        assert_eq!(report["policy"]["max_expansions"], json!(1));
    }

    #[test]
    fn unknown_start_is_an_error() {
        let problem: ProblemV1 = GraphProblemV1::new(true, "Z", "B").with_edge("A", "B", 1.0).into();
        let err = run_problem(&problem, &RunConfig::default()).unwrap_err();
        assert!(matches!(err, RunError::Search(SearchError::InvalidModel(_))));
    }

    #[test]
    fn trace_is_recorded_and_bound() {
        let config = RunConfig {
            policy: SearchPolicyV1::default().with_trace(),
            ..RunConfig::default()
        };
        let output = run_problem(&diamond(), &config).unwrap();
        let trace = output.trace.as_ref().unwrap();
        let trace_value: Value = serde_json::from_slice(trace).unwrap();
        assert_eq!(trace_value["schema_version"], SEARCH_TRACE_SCHEMA);
        let events = trace_value["events"].as_array().unwrap();
        assert_eq!(events[0]["state"], "A");
        assert_eq!(events[0]["parent"], Value::Null);

        let report = report_of(&output);
        assert_eq!(
            report["trace_digest"],
            canonical_hash(HashDomain::SearchTrace, trace).as_str()
        );
    }

    #[test]
    fn and_or_report_lists_solution_nodes() {
        let problem: ProblemV1 = AndOrProblemV1::new("A", "G")
            .with_branch("A", crate::problem::BranchKindSpec::And, ["B", "C"])
            .with_branch("B", crate::problem::BranchKindSpec::Or, ["G"])
            .with_branch("C", crate::problem::BranchKindSpec::Or, ["G"])
            .into();
        let output = run_problem(&problem, &RunConfig::default()).unwrap();
        let report = report_of(&output);
        assert_eq!(report["algorithm"], "ao-star");
        // AND over two unit OR steps: (1 + 1) + 2.
        assert_eq!(report["solution"]["cost"], json!(4));
        assert_eq!(report["solution"]["root"], "A");
        assert_eq!(report["solution"]["nodes"][0]["kind"], "and");
        assert_eq!(report["solution"]["nodes"][0]["children"], json!(["B", "C"]));
    }

    #[test]
    fn csp_report_names_variables() {
        let problem: ProblemV1 = CspProblemV1::new()
            .with_variable("x", [1, 2])
            .with_variable("y", [1, 2])
            .with_constraint(ConstraintKind::NotEqual, ["x", "y"])
            .into();
        let config = RunConfig {
            policy: SearchPolicyV1::default().with_trace(),
            ..RunConfig::default()
        };
        let output = run_problem(&problem, &config).unwrap();
        let report = report_of(&output);
        assert_eq!(report["algorithm"], "cbj");
        assert_eq!(report["options"], json!({"value_order": "lcv", "variable_order": "mrv"}));
        let assignment = &report["solution"]["assignment"];
        assert_ne!(assignment["x"], assignment["y"]);

        let trace: Value = serde_json::from_slice(output.trace.as_ref().unwrap()).unwrap();
        assert_eq!(trace["events"][0]["event"], "assign");
    }

    #[test]
    fn csp_without_solution_reports_no_solution() {
        let problem: ProblemV1 = CspProblemV1::new()
            .with_variable("x", [1])
            .with_variable("y", [1])
            .with_constraint(ConstraintKind::NotEqual, ["x", "y"])
            .into();
        let config = RunConfig {
            csp: CspOptions::chronological(),
            ..RunConfig::default()
        };
        let output = run_problem(&problem, &config).unwrap();
        assert_eq!(output.status, "no_solution");
        assert_eq!(report_of(&output)["algorithm"], "backtracking");
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let config = RunConfig {
            policy: SearchPolicyV1::default().with_trace(),
            ..RunConfig::default()
        };
        let first = run_problem(&diamond(), &config).unwrap();
        for _ in 0..5 {
            let again = run_problem(&diamond(), &config).unwrap();
            assert_eq!(again.report, first.report);
            assert_eq!(again.trace, first.trace);
        }
    }
}
