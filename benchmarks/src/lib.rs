//! Shared regimes and helpers for wayfind benchmark suites.

use wayfind_harness::problem::ProblemV1;
use wayfind_harness::runner::{run_problem, GraphAlgorithm, RunConfig, RunOutput};
use wayfind_harness::worlds::grid::{Cell, Grid, GridWorld};
use wayfind_harness::worlds::{dinner, map_coloring, n_queens, romania};
use wayfind_kernel::canon::canonical_json_bytes;
use wayfind_kernel::hash::{canonical_hash, ContentHash, HashDomain};
use wayfind_search::csp::CspOptions;
use wayfind_search::{SearchPolicyV1, Strategy};

/// One benchmarked configuration: a problem and how to run it.
pub struct Regime {
    pub name: &'static str,
    pub problem: ProblemV1,
    pub config: RunConfig,
}

/// A `size` x `size` grid walled into a serpentine: every fourth column is a
/// wall with a single gap, alternating bottom and top. Start is the top-left
/// corner, goal the bottom-right.
///
/// # Panics
///
/// Panics if `size < 4`.
#[must_use]
pub fn serpentine(size: usize) -> GridWorld {
    assert!(size >= 4, "serpentine needs at least 4 columns");
    let mut grid = Grid::open(size, size);
    for (i, col) in (2..size - 1).step_by(4).enumerate() {
        let gap = if i % 2 == 0 { size - 1 } else { 0 };
        for row in (0..size).filter(|&row| row != gap) {
            grid.set_wall(Cell::new(row, col));
        }
    }
    GridWorld {
        grid,
        start: Cell::new(0, 0),
        goal: Cell::new(size - 1, size - 1),
    }
}

fn graph_regime(name: &'static str, problem: ProblemV1, algorithm: GraphAlgorithm) -> Regime {
    Regime {
        name,
        problem,
        config: RunConfig {
            graph_algorithm: algorithm,
            ..RunConfig::default()
        },
    }
}

fn csp_regime(name: &'static str, problem: ProblemV1, csp: CspOptions) -> Regime {
    Regime {
        name,
        problem,
        config: RunConfig {
            csp,
            ..RunConfig::default()
        },
    }
}

/// The standard regime set, covering each problem kind and the algorithm
/// pairs worth comparing.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    let romania: ProblemV1 = romania::to_bucharest("Arad").into();
    let serpentine: ProblemV1 = serpentine(24).to_problem().into();
    let queens: ProblemV1 = n_queens::queens_problem(8).into();
    vec![
        graph_regime("romania/a-star", romania.clone(), GraphAlgorithm::AStar),
        graph_regime("romania/ucs", romania, GraphAlgorithm::Uninformed(Strategy::UniformCost)),
        graph_regime("serpentine/a-star", serpentine.clone(), GraphAlgorithm::AStar),
        graph_regime("serpentine/greedy", serpentine.clone(), GraphAlgorithm::Greedy),
        graph_regime(
            "serpentine/bidirectional",
            serpentine,
            GraphAlgorithm::Uninformed(Strategy::Bidirectional),
        ),
        csp_regime("queens8/cbj", queens.clone(), CspOptions::default()),
        csp_regime("queens8/backtracking", queens, CspOptions::chronological()),
        csp_regime("australia/cbj", map_coloring::australia().into(), CspOptions::default()),
        Regime {
            name: "dinner/ao-star",
            problem: dinner::dinner().into(),
            config: RunConfig::default(),
        },
    ]
}

/// `BenchInput`-domain digest of what a regime measures: its name, the
/// problem digest and the algorithm the run reports. Results recorded
/// against the same digest are comparable.
///
/// # Panics
///
/// Panics if the regime's problem cannot be serialized or run.
#[must_use]
pub fn input_digest(regime: &Regime) -> ContentHash {
    let output = run_regime(regime, &SearchPolicyV1::default());
    let value = serde_json::json!({
        "algorithm": output.algorithm,
        "problem_digest": regime.problem.digest().expect("problem digest").as_str(),
        "regime": regime.name,
    });
    let bytes = canonical_json_bytes(&value).expect("canonical input");
    canonical_hash(HashDomain::BenchInput, &bytes)
}

/// Run a regime end to end under `policy`.
///
/// # Panics
///
/// Panics if the run fails. Benchmark regimes are expected to be valid.
#[must_use]
pub fn run_regime(regime: &Regime, policy: &SearchPolicyV1) -> RunOutput {
    let config = RunConfig {
        policy: policy.clone(),
        ..regime.config.clone()
    };
    run_problem(&regime.problem, &config).expect("regime run should succeed in benchmarks")
}
