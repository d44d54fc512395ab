//! Shared fixtures for the lock tests: seeded random instances, exhaustive
//! reference solvers, and bundle mutation helpers.

pub mod bundle_test_helpers;
pub mod instances;
