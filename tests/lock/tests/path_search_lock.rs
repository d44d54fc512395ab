//! Path search lock tests against exhaustive enumeration.
//!
//! - UCS and A* (admissible estimate) return minimum-cost paths.
//! - BFS and IDDFS return paths with the fewest edges.
//! - Every strategy returns a real path from start to goal, and reports
//!   `NoSolution` exactly when the goal is unreachable.
//! - The harness run report carries the same path, edge count and cost.

use lock_tests::instances::RandomGraph;
use wayfind_harness::problem::{GraphProblemV1, ProblemV1};
use wayfind_harness::runner::{run_problem, GraphAlgorithm, RunConfig};
use wayfind_search::{
    a_star, greedy_best_first, search, AdjacencyGraph, Cost, Outcome, PathRun, PathSolution, SearchPolicyV1, Strategy,
};

const SEEDS: std::ops::Range<u64> = 0..40;
const STATES: usize = 7;

fn instance(seed: u64) -> RandomGraph {
    RandomGraph::generate(seed, STATES, 0.3, 9)
}

fn assert_valid_path(graph: &AdjacencyGraph<usize>, solution: &PathSolution<usize>, seed: u64, label: &str) {
    assert_eq!(solution.path.first(), Some(&0), "{label} seed {seed}: path does not start at 0");
    assert_eq!(solution.path.last(), Some(&(STATES - 1)), "{label} seed {seed}: path does not end at goal");
    assert_eq!(
        graph.path_cost(&solution.path),
        Some(solution.cost),
        "{label} seed {seed}: reported cost does not match the edges walked"
    );
}

fn every_run(graph: &AdjacencyGraph<usize>, rg: &RandomGraph, seed: u64) -> Vec<(&'static str, PathRun<usize>)> {
    let policy = SearchPolicyV1::default();
    let goal = STATES - 1;
    let h = rg.admissible_heuristic(seed, goal);
    let mut runs: Vec<(&'static str, PathRun<usize>)> = Strategy::ALL
        .into_iter()
        .map(|s| (s.as_str(), search(graph, &0, &goal, s, &policy).unwrap()))
        .collect();
    runs.push(("a-star", a_star(graph, &0, &goal, &h, &policy).unwrap()));
    runs.push(("greedy", greedy_best_first(graph, &0, &goal, &h, &policy).unwrap()));
    runs
}

#[test]
fn cost_optimal_strategies_match_enumeration() {
    let goal = STATES - 1;
    for seed in SEEDS {
        let rg = instance(seed);
        let graph = rg.graph();
        let expected = rg.min_cost(0, goal).map(Cost::from);
        for (label, run) in every_run(&graph, &rg, seed) {
            if label != "ucs" && label != "a-star" {
                continue;
            }
            assert_eq!(
                run.solution().map(|s| s.cost),
                expected,
                "{label} seed {seed}: not the minimum cost"
            );
        }
    }
}

#[test]
fn edge_optimal_strategies_match_enumeration() {
    let goal = STATES - 1;
    for seed in SEEDS {
        let rg = instance(seed);
        let graph = rg.graph();
        let expected = rg.min_edges(0, goal);
        for (label, run) in every_run(&graph, &rg, seed) {
            if label != "bfs" && label != "iddfs" {
                continue;
            }
            assert_eq!(
                run.solution().map(PathSolution::len),
                expected,
                "{label} seed {seed}: not the fewest edges"
            );
        }
    }
}

#[test]
fn every_strategy_returns_a_valid_path_or_proves_none() {
    let goal = STATES - 1;
    let mut unreachable = 0u64;
    for seed in SEEDS {
        let rg = instance(seed);
        let graph = rg.graph();
        let reachable = rg.min_cost(0, goal).is_some();
        if !reachable {
            unreachable += 1;
        }
        for (label, run) in every_run(&graph, &rg, seed) {
            match (&run.outcome, reachable) {
                (Outcome::Solved(solution), true) => assert_valid_path(&graph, solution, seed, label),
                (Outcome::NoSolution, false) => {}
                (outcome, _) => panic!("{label} seed {seed}: reachable={reachable} but got {outcome:?}"),
            }
        }
    }
    assert!(unreachable > 0, "no seed exercised the unreachable case");
    assert!(unreachable < SEEDS.end, "no seed exercised the reachable case");
}

#[test]
fn runs_are_repeatable() {
    for seed in SEEDS.take(10) {
        let rg = instance(seed);
        let graph = rg.graph();
        let policy = SearchPolicyV1::default().with_trace();
        let h = rg.admissible_heuristic(seed, STATES - 1);
        let first = a_star(&graph, &0, &(STATES - 1), &h, &policy).unwrap();
        let second = a_star(&graph, &0, &(STATES - 1), &h, &policy).unwrap();
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.trace, second.trace);
    }
}

fn as_problem(rg: &RandomGraph) -> ProblemV1 {
    let mut problem = GraphProblemV1::new(true, "0", (STATES - 1).to_string());
    problem.states = (0..rg.n).map(|state| state.to_string()).collect();
    for &(from, to, cost) in &rg.edges {
        problem = problem.with_edge(from.to_string(), to.to_string(), f64::from(cost));
    }
    problem.into()
}

#[test]
fn run_report_fields_match_the_path() {
    let goal = STATES - 1;
    let mut solved = 0u64;
    for seed in SEEDS {
        let rg = instance(seed);
        let problem = as_problem(&rg);
        let expected = rg.min_cost(0, goal);
        for algorithm in [GraphAlgorithm::AStar, GraphAlgorithm::Uninformed(Strategy::UniformCost)] {
            let config = RunConfig {
                graph_algorithm: algorithm,
                ..RunConfig::default()
            };
            let output = run_problem(&problem, &config).unwrap();
            let report: serde_json::Value = serde_json::from_slice(&output.report).unwrap();
            let label = &output.algorithm;
            let Some(expected) = expected else {
                assert_eq!(report["outcome"]["status"], "no_solution", "{label} seed {seed}");
                assert_eq!(report["solution"], serde_json::Value::Null, "{label} seed {seed}");
                continue;
            };
            solved += 1;
            let solution = &report["solution"];
            let path = solution["path"].as_array().unwrap();
            assert_eq!(path.first().and_then(|s| s.as_str()), Some("0"), "{label} seed {seed}");
            assert_eq!(
                path.last().and_then(|s| s.as_str()),
                Some(goal.to_string().as_str()),
                "{label} seed {seed}"
            );
            assert_eq!(
                solution["edges"].as_u64(),
                u64::try_from(path.len() - 1).ok(),
                "{label} seed {seed}: edge count disagrees with the path"
            );
            assert_eq!(
                solution["cost"].as_f64(),
                Some(f64::from(expected)),
                "{label} seed {seed}: not the minimum cost"
            );
        }
    }
    assert!(solved > 0, "no seed produced a reachable goal");
}
