//! AO* lock tests on random acyclic AND-OR graphs.
//!
//! - `cost_of` agrees with direct recursion for every state.
//! - Evaluation is idempotent: asking again returns the same cost.
//! - Solution graphs are internally consistent and end at the goal.

use lock_tests::instances::RandomAndOr;
use wayfind_search::{ao_star, AoStar, BranchKind, Cost, Outcome, SearchPolicyV1, SolutionGraph};

const SEEDS: std::ops::Range<u64> = 0..40;
const STATES: usize = 9;

#[test]
fn costs_match_direct_recursion() {
    for seed in SEEDS {
        let instance = RandomAndOr::generate(seed, STATES);
        let graph = instance.graph();
        let mut evaluator = AoStar::new(&graph, &instance.goal()).unwrap();
        for state in 0..STATES {
            let expected = instance.reference_cost(state);
            let first = evaluator.cost_of(&state).unwrap();
            let expansions = evaluator.expansions();
            let second = evaluator.cost_of(&state).unwrap();
            assert_eq!(first.value(), expected, "seed {seed} state {state}");
            assert_eq!(first, second, "seed {seed} state {state}: not idempotent");
            assert_eq!(evaluator.expansions(), expansions, "seed {seed} state {state}: re-expanded");
            assert_eq!(evaluator.is_solved(&state), expected.is_finite(), "seed {seed} state {state}");
        }
    }
}

fn assert_consistent(plan: &SolutionGraph<usize>, goal: usize, seed: u64) {
    for node in &plan.nodes {
        let child_cost = |child: &usize| plan.node(child).unwrap_or_else(|| panic!("seed {seed}: {child} missing")).cost;
        match node.kind {
            None => {
                assert_eq!(node.state, goal, "seed {seed}: leaf {} is not the goal", node.state);
                assert_eq!(node.cost, Cost::ZERO);
                assert!(node.children.is_empty());
            }
            Some(BranchKind::And) => {
                let sum: Cost = node.children.iter().map(child_cost).sum();
                #[allow(clippy::cast_precision_loss)]
                let width = node.children.len() as f64;
                assert_eq!(node.cost.value(), sum.value() + width, "seed {seed}: AND node {}", node.state);
            }
            Some(BranchKind::Or) => {
                assert_eq!(node.children.len(), 1, "seed {seed}: OR node commits to one child");
                let child = child_cost(&node.children[0]);
                assert_eq!(node.cost.value(), child.value() + 1.0, "seed {seed}: OR node {}", node.state);
            }
        }
    }
}

#[test]
fn solution_graphs_are_consistent() {
    let mut solved = 0;
    for seed in SEEDS {
        let instance = RandomAndOr::generate(seed, STATES);
        let graph = instance.graph();
        let goal = instance.goal();
        let run = ao_star(&graph, &0, &goal, &SearchPolicyV1::default()).unwrap();
        let expected = instance.reference_cost(0);
        match run.outcome {
            Outcome::Solved(plan) => {
                solved += 1;
                assert_eq!(plan.root, 0);
                assert_eq!(plan.cost.value(), expected, "seed {seed}");
                assert_eq!(plan.node(&0).map(|n| n.cost), Some(plan.cost));
                assert_consistent(&plan, goal, seed);
            }
            Outcome::NoSolution => assert!(expected.is_infinite(), "seed {seed}: missed a plan of cost {expected}"),
            Outcome::ResourceExhausted(budget) => panic!("seed {seed}: unbounded run exhausted {budget:?}"),
        }
    }
    assert!(solved > 0, "no seed produced a solvable graph");
}

#[test]
fn repeated_runs_return_the_same_plan() {
    for seed in SEEDS.take(10) {
        let instance = RandomAndOr::generate(seed, STATES);
        let graph = instance.graph();
        let first = ao_star(&graph, &0, &instance.goal(), &SearchPolicyV1::default()).unwrap();
        let second = ao_star(&graph, &0, &instance.goal(), &SearchPolicyV1::default()).unwrap();
        assert_eq!(first.outcome, second.outcome, "seed {seed}");
        assert_eq!(first.stats, second.stats, "seed {seed}");
    }
}
