//! Hash domain governance lock tests.
//!
//! 1. The domain set has the expected size (catches forgotten additions).
//! 2. Domain byte strings are unique, null-terminated, and follow
//!    `WAYFIND::*::V1\0`.
//! 3. No raw `WAYFIND::` literal appears in production source outside
//!    `hash_domain.rs`.
//! 4. Known digests stay fixed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use wayfind_kernel::hash::{canonical_hash, HashDomain};

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        6,
        "expected 6 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_bytes_are_well_formed() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(seen.insert(bytes), "duplicate domain bytes: {domain}");
        assert!(bytes.starts_with(b"WAYFIND::"), "{domain} does not start with WAYFIND::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
        assert_eq!(
            bytes.iter().filter(|&&b| b == 0).count(),
            1,
            "{domain} has an interior null"
        );
    }
}

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn no_raw_domain_literals_outside_hash_domain() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let mut files = Vec::new();
    for krate in ["kernel", "search", "harness"] {
        rust_sources(&root.join(krate).join("src"), &mut files);
    }
    assert!(!files.is_empty(), "no sources found under {}", root.display());

    let offenders: Vec<String> = files
        .iter()
        .filter(|path| path.file_name().is_some_and(|name| name != "hash_domain.rs"))
        .filter(|path| fs::read_to_string(path).unwrap().contains("b\"WAYFIND::"))
        .map(|path| path.display().to_string())
        .collect();
    assert!(offenders.is_empty(), "raw domain literals in {offenders:?}");
}

#[test]
fn domains_separate_identical_content() {
    let digests: BTreeSet<String> = HashDomain::ALL
        .iter()
        .map(|&domain| canonical_hash(domain, b"{}").as_str().to_string())
        .collect();
    assert_eq!(digests.len(), HashDomain::ALL.len());
}

#[test]
fn golden_digests_are_pinned() {
    assert_eq!(
        canonical_hash(HashDomain::ProblemSnapshot, b"{}").as_str(),
        "sha256:00d0ba66f7d65e37d2860f95de716ed556dcbef63f0de85774f6097f71e36a3d"
    );
    assert_eq!(
        canonical_hash(HashDomain::BundleDigest, b"").as_str(),
        "sha256:9dedbc973e562f4761fc69a7ead8890390f9039dad3fee2246e285767c78a265"
    );
}
