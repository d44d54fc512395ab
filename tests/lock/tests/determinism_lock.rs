//! In-process determinism for every bundled world.
//!
//! - Ten runs of the same problem and configuration produce byte-identical
//!   problem, report and trace artifacts, and the same bundle digest.
//! - The problem digest depends on the problem only, not on the algorithm.
//! - Reordered keys in a problem file do not change its canonical bytes.

use wayfind_harness::problem::ProblemV1;
use wayfind_harness::runner::{run_problem, GraphAlgorithm, RunConfig};
use wayfind_harness::worlds::{romania, World};
use wayfind_search::SearchPolicyV1;

fn traced() -> RunConfig {
    RunConfig {
        policy: SearchPolicyV1::default().with_trace(),
        ..RunConfig::default()
    }
}

#[test]
fn ten_runs_are_byte_identical() {
    for world in World::ALL {
        let problem = world.problem().unwrap();
        let baseline = run_problem(&problem, &traced()).unwrap();
        let baseline_digest = baseline.to_bundle().unwrap().digest;
        assert!(baseline.trace.is_some(), "{world}: trace not recorded");

        for i in 1..=10 {
            let output = run_problem(&problem, &traced()).unwrap();
            assert_eq!(output.problem, baseline.problem, "{world} run {i}: problem bytes differ");
            assert_eq!(output.report, baseline.report, "{world} run {i}: report bytes differ");
            assert_eq!(output.trace, baseline.trace, "{world} run {i}: trace bytes differ");
            assert_eq!(output.report_digest(), baseline.report_digest());
            assert_eq!(output.to_bundle().unwrap().digest, baseline_digest, "{world} run {i}");
        }
    }
}

#[test]
fn problem_digest_is_independent_of_algorithm() {
    let problem: ProblemV1 = romania::to_bucharest("Arad").into();
    let expected = problem.digest().unwrap();

    let mut reports = Vec::new();
    for algorithm in GraphAlgorithm::ALL {
        let config = RunConfig {
            graph_algorithm: algorithm,
            ..RunConfig::default()
        };
        let output = run_problem(&problem, &config).unwrap();
        let report: serde_json::Value = serde_json::from_slice(&output.report).unwrap();
        assert_eq!(report["problem_digest"], expected.as_str(), "{algorithm}");
        assert_eq!(report["algorithm"], algorithm.as_str());
        reports.push(output.report);
    }
    reports.sort();
    reports.dedup();
    assert_eq!(reports.len(), GraphAlgorithm::ALL.len(), "two algorithms wrote identical reports");
}

#[test]
fn key_order_does_not_reach_canonical_bytes() {
    let forward = br#"{"schema_version":"graph_problem.v1","directed":true,"start":"a","goal":"b","edges":[{"from":"a","to":"b","cost":2}]}"#;
    let shuffled = br#"{"edges":[{"cost":2,"to":"b","from":"a"}],"goal":"b","start":"a","directed":true,"schema_version":"graph_problem.v1"}"#;
    let a = ProblemV1::from_json(forward).unwrap();
    let b = ProblemV1::from_json(shuffled).unwrap();
    assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    assert_eq!(a.digest().unwrap(), b.digest().unwrap());
}

#[test]
fn canonical_problem_bytes_reparse_to_themselves() {
    for world in World::ALL {
        let bytes = world.problem().unwrap().canonical_bytes().unwrap();
        let reparsed = ProblemV1::from_json(&bytes).unwrap();
        assert_eq!(reparsed.canonical_bytes().unwrap(), bytes, "{world}");
    }
}
