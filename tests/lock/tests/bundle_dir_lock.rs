//! Bundle lock tests over real runs.
//!
//! - A run written to disk reads back and verifies with the same digest.
//! - Tampering with any artifact on disk is caught.
//! - A resealed bundle whose report no longer matches its problem or trace
//!   is caught by the binding checks, not the hash checks.

use std::fs;

use lock_tests::bundle_test_helpers::{rebuild_with, rebuild_with_modified_report, rebuild_without_artifact};
use wayfind_harness::bundle::{
    verify_bundle, ArtifactBundleV1, BundleVerifyError, PROBLEM_ARTIFACT, REPORT_ARTIFACT, TRACE_ARTIFACT,
};
use wayfind_harness::bundle_dir::{verify_bundle_dir, write_bundle_dir, BundleDirError};
use wayfind_harness::runner::{run_problem, RunConfig};
use wayfind_harness::worlds::World;
use wayfind_search::SearchPolicyV1;

fn traced_bundle(world: World) -> ArtifactBundleV1 {
    let config = RunConfig {
        policy: SearchPolicyV1::default().with_trace(),
        ..RunConfig::default()
    };
    let output = run_problem(&world.problem().unwrap(), &config).unwrap();
    output.to_bundle().unwrap()
}

#[test]
fn every_world_round_trips_through_disk() {
    for world in World::ALL {
        let bundle = traced_bundle(world);
        verify_bundle(&bundle).unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_bundle_dir(&bundle, dir.path()).unwrap();
        let loaded = verify_bundle_dir(dir.path()).unwrap();
        assert_eq!(loaded.digest, bundle.digest, "{world}");
        assert_eq!(loaded.artifacts, bundle.artifacts, "{world}");
    }
}

#[test]
fn tampering_with_any_artifact_on_disk_is_caught() {
    let bundle = traced_bundle(World::Romania);
    for name in [PROBLEM_ARTIFACT, REPORT_ARTIFACT, TRACE_ARTIFACT] {
        let dir = tempfile::tempdir().unwrap();
        write_bundle_dir(&bundle, dir.path()).unwrap();

        let path = dir.path().join(name);
        let mut content = fs::read(&path).unwrap();
        content.push(b' ');
        fs::write(&path, content).unwrap();

        let err = verify_bundle_dir(dir.path()).unwrap_err();
        assert!(
            matches!(err, BundleDirError::Verify(BundleVerifyError::ContentHashMismatch { .. })),
            "{name}: {err}"
        );
    }
}

#[test]
fn resealed_report_with_wrong_problem_digest_fails_binding() {
    let bundle = traced_bundle(World::Australia);
    let forged = rebuild_with_modified_report(&bundle, |report| {
        report["problem_digest"] = serde_json::json!(
            "sha256:0000000000000000000000000000000000000000000000000000000000000000"
        );
    });
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::ProblemDigestMismatch { .. })
    ));
}

#[test]
fn resealed_bundle_with_other_worlds_trace_fails_binding() {
    let bundle = traced_bundle(World::Maze);
    let other = traced_bundle(World::Romania);
    let foreign_trace = other.artifact(TRACE_ARTIFACT).unwrap().content.clone();
    let forged = rebuild_with(&bundle, |name, content| {
        Some(if name == TRACE_ARTIFACT {
            foreign_trace.clone()
        } else {
            content.to_vec()
        })
    });
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::TraceDigestMismatch { .. })
    ));
}

#[test]
fn dropping_a_declared_trace_fails_binding() {
    let bundle = traced_bundle(World::Dinner);
    let forged = rebuild_without_artifact(&bundle, TRACE_ARTIFACT);
    assert!(matches!(verify_bundle(&forged), Err(BundleVerifyError::TraceMissing)));
}

#[test]
fn trace_does_not_move_the_digest_but_report_does() {
    let bundle = traced_bundle(World::Queens);
    let without_trace = rebuild_with_modified_report(&rebuild_without_artifact(&bundle, TRACE_ARTIFACT), |report| {
        report["trace_digest"] = serde_json::Value::Null;
    });
    verify_bundle(&without_trace).unwrap();
    // The report changed (trace_digest), so the normative digest changes.
    assert_ne!(without_trace.digest, bundle.digest);
    assert_eq!(
        without_trace.artifact(PROBLEM_ARTIFACT).unwrap().content_hash,
        bundle.artifact(PROBLEM_ARTIFACT).unwrap().content_hash
    );
}
