//! In-memory artifact bundle: the packaged output of a harness run.
//!
//! No file I/O in this module (see [`crate::bundle_dir`] for that).
//!
//! # Normative vs observational artifacts
//!
//! Each artifact is tagged `normative` (participates in the bundle digest)
//! or observational (listed in the manifest but excluded from the digest).
//!
//! | Artifact          | Normative | Content                              |
//! |-------------------|-----------|--------------------------------------|
//! | `problem.json`    | yes       | canonical problem file               |
//! | `run_report.json` | yes       | canonical run report                 |
//! | `trace.json`      | no        | expansion / assignment events        |
//!
//! `trace.json` is observational; the report commits to it through
//! `trace_digest`, so it cannot be swapped without breaking verification.
//!
//! The bundle digest is computed over the **digest basis**: a canonical
//! JSON projection of normative artifact hashes only.

use std::collections::BTreeMap;

use serde_json::Value;

use wayfind_kernel::canon::{canonical_json_bytes, parse_canonical, CanonError};
use wayfind_kernel::hash::{canonical_hash, ContentHash, HashDomain};

pub const PROBLEM_ARTIFACT: &str = "problem.json";
pub const REPORT_ARTIFACT: &str = "run_report.json";
pub const TRACE_ARTIFACT: &str = "trace.json";

pub const MANIFEST_SCHEMA: &str = "bundle.v1";
pub const DIGEST_BASIS_SCHEMA: &str = "bundle_digest_basis.v1";

/// A single artifact in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// File name (e.g. `"run_report.json"`).
    pub name: String,
    pub content: Vec<u8>,
    /// `BundleArtifact`-domain hash of `content`.
    pub content_hash: ContentHash,
    /// Whether this artifact participates in the bundle digest.
    pub normative: bool,
}

/// A complete run bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBundleV1 {
    /// Artifacts keyed by name, sorted.
    pub artifacts: BTreeMap<String, BundleArtifact>,
    /// Canonical JSON listing every artifact.
    pub manifest: Vec<u8>,
    /// Canonical JSON listing normative artifacts only.
    pub digest_basis: Vec<u8>,
    /// `BundleDigest`-domain hash of `digest_basis`.
    pub digest: ContentHash,
}

impl ArtifactBundleV1 {
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&BundleArtifact> {
        self.artifacts.get(name)
    }

    /// The run report, parsed. `None` if absent or not JSON.
    #[must_use]
    pub fn report(&self) -> Option<Value> {
        let artifact = self.artifact(REPORT_ARTIFACT)?;
        serde_json::from_slice(&artifact.content).ok()
    }
}

/// Error building a bundle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleBuildError {
    #[error("canonical JSON: {0}")]
    Canon(#[from] CanonError),
    #[error("precomputed hash for {name} is {expected}, content hashes to {computed}")]
    PrecomputedHashMismatch {
        name: String,
        expected: String,
        computed: String,
    },
}

/// Input for one artifact of [`build_bundle`].
#[derive(Debug, Clone)]
pub struct ArtifactInput {
    pub name: String,
    pub content: Vec<u8>,
    pub normative: bool,
    /// Hash the caller already computed; checked, not trusted.
    pub precomputed_hash: Option<ContentHash>,
}

impl From<(String, Vec<u8>, bool)> for ArtifactInput {
    fn from((name, content, normative): (String, Vec<u8>, bool)) -> Self {
        Self {
            name,
            content,
            normative,
            precomputed_hash: None,
        }
    }
}

/// Build an `ArtifactBundleV1` from a list of artifact inputs.
///
/// Computes content hashes (or checks precomputed ones), builds the sorted
/// manifest and digest basis, and derives the bundle digest.
///
/// # Errors
///
/// [`BundleBuildError::PrecomputedHashMismatch`] when a supplied hash does
/// not match the content.
pub fn build_bundle(artifacts: Vec<impl Into<ArtifactInput>>) -> Result<ArtifactBundleV1, BundleBuildError> {
    let mut artifact_map = BTreeMap::new();

    for input in artifacts {
        let input = input.into();
        let computed = canonical_hash(HashDomain::BundleArtifact, &input.content);
        if let Some(expected) = &input.precomputed_hash {
            if *expected != computed {
                return Err(BundleBuildError::PrecomputedHashMismatch {
                    name: input.name,
                    expected: expected.to_string(),
                    computed: computed.to_string(),
                });
            }
        }
        artifact_map.insert(
            input.name.clone(),
            BundleArtifact {
                name: input.name,
                content: input.content,
                content_hash: computed,
                normative: input.normative,
            },
        );
    }

    let manifest = compute_manifest_bytes(&artifact_map)?;
    let digest_basis = compute_digest_basis_bytes(&artifact_map)?;
    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);

    Ok(ArtifactBundleV1 {
        artifacts: artifact_map,
        manifest,
        digest_basis,
        digest,
    })
}

/// Error from bundle integrity verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleVerifyError {
    #[error("{artifact}: content hash {actual} does not match declared {expected}")]
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    #[error("manifest does not match the artifacts")]
    ManifestMismatch,
    #[error("manifest is not canonical JSON")]
    ManifestNotCanonical,
    #[error("digest basis does not match the normative artifacts")]
    DigestBasisMismatch,
    #[error("digest basis is not canonical JSON")]
    DigestBasisNotCanonical,
    #[error("bundle digest {actual} does not match declared {expected}")]
    DigestMismatch { expected: String, actual: String },
    #[error("normative artifact {artifact} is not canonical JSON")]
    ArtifactNotCanonical { artifact: String },
    #[error("run report field {field:?} is missing or not a string")]
    ReportFieldMissing { field: &'static str },
    #[error("report problem_digest {declared} does not match problem.json ({actual})")]
    ProblemDigestMismatch { declared: String, actual: String },
    #[error("report trace_digest {declared} does not match trace.json ({actual})")]
    TraceDigestMismatch { declared: String, actual: String },
    #[error("report declares a trace_digest but trace.json is absent")]
    TraceMissing,
    #[error("trace.json is present but the report declares no trace_digest")]
    TraceUndeclared,
    #[error("canonical JSON: {0}")]
    Canon(#[from] CanonError),
}

/// Verify a bundle's integrity.
///
/// Checks, in order: artifact content hashes; manifest and digest basis
/// recomputed byte-for-byte and canonical; bundle digest; normative JSON
/// artifacts canonical; then the report's bindings to `problem.json` and
/// `trace.json`.
///
/// # Errors
///
/// The first failed check as a [`BundleVerifyError`].
pub fn verify_bundle(bundle: &ArtifactBundleV1) -> Result<(), BundleVerifyError> {
    for artifact in bundle.artifacts.values() {
        let recomputed = canonical_hash(HashDomain::BundleArtifact, &artifact.content);
        if recomputed != artifact.content_hash {
            return Err(BundleVerifyError::ContentHashMismatch {
                artifact: artifact.name.clone(),
                expected: artifact.content_hash.to_string(),
                actual: recomputed.to_string(),
            });
        }
    }

    if compute_manifest_bytes(&bundle.artifacts)? != bundle.manifest {
        return Err(BundleVerifyError::ManifestMismatch);
    }
    if parse_canonical(&bundle.manifest).is_none() {
        return Err(BundleVerifyError::ManifestNotCanonical);
    }

    if compute_digest_basis_bytes(&bundle.artifacts)? != bundle.digest_basis {
        return Err(BundleVerifyError::DigestBasisMismatch);
    }
    if parse_canonical(&bundle.digest_basis).is_none() {
        return Err(BundleVerifyError::DigestBasisNotCanonical);
    }

    let recomputed_digest = canonical_hash(HashDomain::BundleDigest, &bundle.digest_basis);
    if recomputed_digest != bundle.digest {
        return Err(BundleVerifyError::DigestMismatch {
            expected: bundle.digest.to_string(),
            actual: recomputed_digest.to_string(),
        });
    }

    for artifact in bundle.artifacts.values() {
        let is_json = std::path::Path::new(&artifact.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if artifact.normative && is_json && parse_canonical(&artifact.content).is_none() {
            return Err(BundleVerifyError::ArtifactNotCanonical {
                artifact: artifact.name.clone(),
            });
        }
    }

    verify_report_bindings(bundle)
}

/// When `run_report.json` is present, its `problem_digest` must hash
/// `problem.json` and its `trace_digest` must hash `trace.json` (or be null
/// exactly when there is no trace).
fn verify_report_bindings(bundle: &ArtifactBundleV1) -> Result<(), BundleVerifyError> {
    let Some(report) = bundle.artifact(REPORT_ARTIFACT) else {
        return Ok(());
    };
    let Some(report) = parse_canonical(&report.content) else {
        return Err(BundleVerifyError::ArtifactNotCanonical {
            artifact: REPORT_ARTIFACT.to_string(),
        });
    };

    if let Some(problem) = bundle.artifact(PROBLEM_ARTIFACT) {
        let declared = report["problem_digest"]
            .as_str()
            .ok_or(BundleVerifyError::ReportFieldMissing {
                field: "problem_digest",
            })?;
        let actual = canonical_hash(HashDomain::ProblemSnapshot, &problem.content);
        if declared != actual.as_str() {
            return Err(BundleVerifyError::ProblemDigestMismatch {
                declared: declared.to_string(),
                actual: actual.to_string(),
            });
        }
    }

    match (report["trace_digest"].as_str(), bundle.artifact(TRACE_ARTIFACT)) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(BundleVerifyError::TraceMissing),
        (None, Some(_)) => Err(BundleVerifyError::TraceUndeclared),
        (Some(declared), Some(trace)) => {
            let actual = canonical_hash(HashDomain::SearchTrace, &trace.content);
            if declared == actual.as_str() {
                Ok(())
            } else {
                Err(BundleVerifyError::TraceDigestMismatch {
                    declared: declared.to_string(),
                    actual: actual.to_string(),
                })
            }
        }
    }
}

fn compute_manifest_bytes(artifacts: &BTreeMap<String, BundleArtifact>) -> Result<Vec<u8>, CanonError> {
    let entries: Vec<Value> = artifacts
        .values()
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
                "normative": a.normative,
            })
        })
        .collect();

    canonical_json_bytes(&serde_json::json!({
        "artifacts": entries,
        "schema_version": MANIFEST_SCHEMA,
    }))
}

fn compute_digest_basis_bytes(artifacts: &BTreeMap<String, BundleArtifact>) -> Result<Vec<u8>, CanonError> {
    let entries: Vec<Value> = artifacts
        .values()
        .filter(|a| a.normative)
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
            })
        })
        .collect();

    canonical_json_bytes(&serde_json::json!({
        "artifacts": entries,
        "schema_version": DIGEST_BASIS_SCHEMA,
    }))
}
