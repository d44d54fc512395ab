//! Helpers for mutating and rebuilding artifact bundles.
//!
//! A rebuilt bundle has fresh content hashes, manifest and digest, so the
//! only check left to fail is the semantic one a test means to exercise.

use wayfind_harness::bundle::{build_bundle, ArtifactBundleV1, REPORT_ARTIFACT};
use wayfind_kernel::canon::canonical_json_bytes;

/// Rebuild `bundle` with `artifacts` filtered and mapped by `edit`.
/// Returning `None` from `edit` drops the artifact.
///
/// # Panics
///
/// Panics if the rebuilt bundle cannot be sealed.
pub fn rebuild_with(
    bundle: &ArtifactBundleV1,
    mut edit: impl FnMut(&str, &[u8]) -> Option<Vec<u8>>,
) -> ArtifactBundleV1 {
    let artifacts: Vec<(String, Vec<u8>, bool)> = bundle
        .artifacts
        .values()
        .filter_map(|a| edit(&a.name, &a.content).map(|content| (a.name.clone(), content, a.normative)))
        .collect();
    build_bundle(artifacts).unwrap()
}

/// Rebuild with the run report's JSON edited by `modify`.
///
/// # Panics
///
/// Panics if the bundle has no report or the report is not JSON.
pub fn rebuild_with_modified_report(
    bundle: &ArtifactBundleV1,
    modify: impl FnOnce(&mut serde_json::Value),
) -> ArtifactBundleV1 {
    let mut modify = Some(modify);
    rebuild_with(bundle, |name, content| {
        if name != REPORT_ARTIFACT {
            return Some(content.to_vec());
        }
        let mut report: serde_json::Value = serde_json::from_slice(content).unwrap();
        if let Some(modify) = modify.take() {
            modify(&mut report);
        }
        Some(canonical_json_bytes(&report).unwrap())
    })
}

/// Rebuild without the named artifact.
///
/// # Panics
///
/// Panics if the rebuilt bundle cannot be sealed.
pub fn rebuild_without_artifact(bundle: &ArtifactBundleV1, artifact: &str) -> ArtifactBundleV1 {
    rebuild_with(bundle, |name, content| (name != artifact).then(|| content.to_vec()))
}
