//! Wayfind Kernel: canonical bytes and content hashing.
//!
//! Everything that leaves the engine as an artifact (problem snapshots, run
//! reports, bundle manifests) is serialized through [`canon`] and addressed
//! through [`hash`]. The kernel knows nothing about search.
//!
//! # Module Dependency Direction
//!
//! `hash_domain` ← `hash`, `canon` (independent)
//!
//! One-way only. No cycles.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canon;
pub mod hash;
pub mod hash_domain;
