//! Bundle directory persistence: write, read and verify an
//! [`ArtifactBundleV1`] on disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   bundle_manifest.json       canonical JSON, full artifact listing
//!   bundle_digest_basis.json   canonical JSON, normative projection only
//!   bundle_digest.txt          digest string ("sha256:...")
//!   problem.json               artifact (normative)
//!   run_report.json            artifact (normative)
//!   trace.json                 artifact (observational, optional)
//! ```
//!
//! The directory path is never part of any hash. The manifest's artifact
//! list is the source of truth for which files must exist.
//!
//! # Fail-closed reading
//!
//! Missing declared artifacts, undeclared extra files, a manifest of the
//! wrong version and a stored digest that does not match the digest basis
//! are all errors. Content tampering is caught by [`verify_bundle_dir`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use wayfind_kernel::hash::{canonical_hash, ContentHash, HashDomain};

use crate::bundle::{verify_bundle, ArtifactBundleV1, BundleArtifact, BundleVerifyError, MANIFEST_SCHEMA};

const MANIFEST_FILENAME: &str = "bundle_manifest.json";
const DIGEST_BASIS_FILENAME: &str = "bundle_digest_basis.json";
const DIGEST_FILENAME: &str = "bundle_digest.txt";

const METADATA_FILENAMES: &[&str] = &[MANIFEST_FILENAME, DIGEST_BASIS_FILENAME, DIGEST_FILENAME];

/// Prefix of in-flight files written by [`write_bundle_dir`].
const TEMP_PREFIX: &str = ".tmp_";

/// Error writing, reading or verifying a bundle directory.
#[derive(Debug, thiserror::Error)]
pub enum BundleDirError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing metadata file {filename}")]
    MissingMetadata { filename: &'static str },
    #[error("missing artifact {name}")]
    MissingArtifact { name: String },
    #[error("undeclared extra file {name}")]
    ExtraFile { name: String },
    #[error("manifest parse error: {detail}")]
    ManifestParse { detail: String },
    #[error("manifest schema_version {found:?}, expected \"bundle.v1\"")]
    ManifestVersionMismatch { found: String },
    #[error("manifest entry invalid: {detail}")]
    ManifestEntryInvalid { detail: String },
    #[error("stored digest {stored} does not match recomputed {recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
    #[error("bundle verification failed: {0}")]
    Verify(#[from] BundleVerifyError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BundleDirError + '_ {
    move |source| BundleDirError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `bundle` into `dir`, creating it if needed.
///
/// Each file goes to a temporary name first and is then renamed into place.
///
/// # Errors
///
/// [`BundleDirError::Io`] on any filesystem failure.
pub fn write_bundle_dir(bundle: &ArtifactBundleV1, dir: &Path) -> Result<(), BundleDirError> {
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;

    for artifact in bundle.artifacts.values() {
        write_atomic(dir, &artifact.name, &artifact.content)?;
    }
    write_atomic(dir, MANIFEST_FILENAME, &bundle.manifest)?;
    write_atomic(dir, DIGEST_BASIS_FILENAME, &bundle.digest_basis)?;
    write_atomic(dir, DIGEST_FILENAME, bundle.digest.as_str().as_bytes())?;

    tracing::debug!(dir = %dir.display(), digest = %bundle.digest, "bundle written");
    Ok(())
}

/// Read a bundle directory.
///
/// Structural checks only; call [`verify_bundle_dir`] (or
/// [`verify_bundle`] on the result) for content integrity.
///
/// # Errors
///
/// The first structural problem found, as a [`BundleDirError`].
pub fn read_bundle_dir(dir: &Path) -> Result<ArtifactBundleV1, BundleDirError> {
    let manifest_bytes = read_required(dir, MANIFEST_FILENAME)?;
    let digest_basis_bytes = read_required(dir, DIGEST_BASIS_FILENAME)?;
    let digest_bytes = read_required(dir, DIGEST_FILENAME)?;

    let manifest: serde_json::Value =
        serde_json::from_slice(&manifest_bytes).map_err(|e| BundleDirError::ManifestParse {
            detail: e.to_string(),
        })?;

    let schema_version = manifest["schema_version"].as_str().unwrap_or_default();
    if schema_version != MANIFEST_SCHEMA {
        return Err(BundleDirError::ManifestVersionMismatch {
            found: schema_version.to_string(),
        });
    }

    let entries = manifest["artifacts"]
        .as_array()
        .ok_or_else(|| BundleDirError::ManifestParse {
            detail: "\"artifacts\" is not an array".into(),
        })?;

    let mut artifacts = BTreeMap::new();
    for entry in entries {
        let artifact = read_artifact(dir, entry)?;
        artifacts.insert(artifact.name.clone(), artifact);
    }

    for filename in list_files(dir)? {
        if !artifacts.contains_key(&filename) && !METADATA_FILENAMES.contains(&filename.as_str()) {
            return Err(BundleDirError::ExtraFile { name: filename });
        }
    }

    let recomputed = canonical_hash(HashDomain::BundleDigest, &digest_basis_bytes);
    let stored = String::from_utf8_lossy(&digest_bytes).trim().to_string();
    if recomputed.as_str() != stored {
        return Err(BundleDirError::DigestMismatch {
            stored,
            recomputed: recomputed.to_string(),
        });
    }

    Ok(ArtifactBundleV1 {
        artifacts,
        manifest: manifest_bytes,
        digest_basis: digest_basis_bytes,
        digest: recomputed,
    })
}

/// Read `dir` and run [`verify_bundle`] on it.
///
/// # Errors
///
/// [`BundleDirError`] for structural problems, or
/// [`BundleDirError::Verify`] for integrity failures.
pub fn verify_bundle_dir(dir: &Path) -> Result<ArtifactBundleV1, BundleDirError> {
    let bundle = read_bundle_dir(dir)?;
    verify_bundle(&bundle)?;
    Ok(bundle)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn read_artifact(dir: &Path, entry: &serde_json::Value) -> Result<BundleArtifact, BundleDirError> {
    let invalid = |detail: String| BundleDirError::ManifestEntryInvalid { detail };

    let name = entry["name"]
        .as_str()
        .ok_or_else(|| invalid("missing \"name\"".to_string()))?
        .to_string();
    // Artifacts are plain file names inside the bundle directory.
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(invalid(format!("artifact name {name:?} is not a plain file name")));
    }
    let hash = entry["content_hash"]
        .as_str()
        .ok_or_else(|| invalid(format!("missing \"content_hash\" for {name}")))?;
    let content_hash =
        ContentHash::parse(hash).ok_or_else(|| invalid(format!("invalid content_hash for {name}: {hash}")))?;
    let normative = entry["normative"]
        .as_bool()
        .ok_or_else(|| invalid(format!("missing \"normative\" for {name}")))?;

    let content = std::fs::read(dir.join(&name)).map_err(|_| BundleDirError::MissingArtifact { name: name.clone() })?;

    Ok(BundleArtifact {
        name,
        content,
        content_hash,
        normative,
    })
}

fn write_atomic(dir: &Path, filename: &str, content: &[u8]) -> Result<(), BundleDirError> {
    let path = dir.join(filename);
    let temp_path = dir.join(format!("{TEMP_PREFIX}{filename}"));
    std::fs::write(&temp_path, content).map_err(io_error(&temp_path))?;
    std::fs::rename(&temp_path, &path).map_err(io_error(&path))
}

fn read_required(dir: &Path, filename: &'static str) -> Result<Vec<u8>, BundleDirError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirError::MissingMetadata { filename })
}

/// Regular files in `dir`, skipping in-flight temporaries.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirError> {
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with(TEMP_PREFIX) => {}
            Ok(name) => {
                files.insert(name);
            }
            Err(raw) => {
                return Err(BundleDirError::ExtraFile {
                    name: raw.to_string_lossy().into_owned(),
                })
            }
        }
    }
    Ok(files)
}
