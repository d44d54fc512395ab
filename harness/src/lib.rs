//! Wayfind Harness: problem files, runs, reports and bundles.
//!
//! The harness turns a problem file into an engine model, runs it with the
//! requested algorithm and budgets, and packages the result as a canonical
//! run report inside a content-addressed bundle.
//!
//! The harness implements no search logic; it delegates to
//! `wayfind_search`. Canonical bytes and hashes come from `wayfind_kernel`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle;
pub mod bundle_dir;
pub mod problem;
pub mod runner;
pub mod worlds;
