//! CSP lock tests against brute-force enumeration.
//!
//! - Every option set solves exactly the satisfiable instances, and what it
//!   returns satisfies every constraint.
//! - Under the same static variable order and domain value order,
//!   conflict-directed backjumping never tries more values than
//!   chronological backtracking.
//! - A trial budget too small to finish ends in `ResourceExhausted`.

use lock_tests::instances::RandomCsp;
use wayfind_search::csp::{solve, Backtracking, CspOptions, ValueOrder, VariableOrder};
use wayfind_search::{Budget, Outcome, SearchPolicyV1};

const SEEDS: std::ops::Range<u64> = 0..60;

fn instance(seed: u64) -> RandomCsp {
    RandomCsp::generate(seed, 6, 4, 0.5, 0.6)
}

fn option_sets() -> Vec<CspOptions> {
    let mut sets = Vec::new();
    for backtracking in [Backtracking::Chronological, Backtracking::ConflictDirected] {
        for variable_order in [VariableOrder::Static, VariableOrder::Mrv] {
            for value_order in [ValueOrder::Domain, ValueOrder::Lcv] {
                sets.push(CspOptions {
                    backtracking,
                    variable_order,
                    value_order,
                });
            }
        }
    }
    sets
}

#[test]
fn every_option_set_agrees_with_enumeration() {
    let mut satisfiable = 0u64;
    for seed in SEEDS {
        let instance = instance(seed);
        let csp = instance.csp();
        let solutions = instance.count_solutions();
        if solutions > 0 {
            satisfiable += 1;
        }
        for options in option_sets() {
            let run = solve(&csp, options, &SearchPolicyV1::default()).unwrap();
            match run.outcome {
                Outcome::Solved(assignment) => {
                    assert!(solutions > 0, "seed {seed} {options:?}: solved an unsatisfiable instance");
                    let values: Vec<u8> = csp.variables().map(|v| *assignment.get(v)).collect();
                    assert!(instance.satisfied_by(&values), "seed {seed} {options:?}: {values:?}");
                    assert!(assignment.satisfies(&csp));
                }
                Outcome::NoSolution => {
                    assert_eq!(solutions, 0, "seed {seed} {options:?}: missed {solutions} solutions");
                }
                Outcome::ResourceExhausted(budget) => panic!("seed {seed}: unbounded run exhausted {budget:?}"),
            }
        }
    }
    assert!(satisfiable > 0, "no seed produced a satisfiable instance");
    assert!(satisfiable < SEEDS.end, "no seed produced an unsatisfiable instance");
}

#[test]
fn backjumping_never_tries_more_values_than_backtracking() {
    let cbj = CspOptions {
        backtracking: Backtracking::ConflictDirected,
        variable_order: VariableOrder::Static,
        value_order: ValueOrder::Domain,
    };
    let mut saved = 0;
    for seed in SEEDS {
        let csp = instance(seed).csp();
        let jumping = solve(&csp, cbj, &SearchPolicyV1::default()).unwrap();
        let chronological = solve(&csp, CspOptions::chronological(), &SearchPolicyV1::default()).unwrap();
        assert_eq!(jumping.is_solved(), chronological.is_solved(), "seed {seed}");
        assert!(
            jumping.stats.expansions <= chronological.stats.expansions,
            "seed {seed}: cbj tried {} values, chronological {}",
            jumping.stats.expansions,
            chronological.stats.expansions
        );
        assert_eq!(chronological.stats.backjumps, 0, "seed {seed}: chronological search jumped");
        saved += chronological.stats.expansions - jumping.stats.expansions;
    }
    assert!(saved > 0, "backjumping never pruned anything across {} seeds", SEEDS.end);
}

#[test]
fn small_trial_budget_is_inconclusive() {
    for seed in SEEDS {
        let instance = instance(seed);
        if instance.count_solutions() == 0 {
            continue;
        }
        // Six variables need at least six trials.
        let policy = SearchPolicyV1::default().with_max_expansions(2);
        let run = solve(&instance.csp(), CspOptions::default(), &policy).unwrap();
        assert_eq!(run.outcome, Outcome::ResourceExhausted(Budget::Expansions), "seed {seed}");
        assert!(run.stats.expansions <= 2, "seed {seed}");
    }
}
