//! Map colouring as `csp_problem.v1`: one variable per region, one
//! `not_equal` per shared border.

use crate::problem::{ConstraintKind, CspProblemV1};

pub const RGB: &[&str] = &["red", "green", "blue"];

/// Mainland states and territories of Australia plus Tasmania.
pub const AUSTRALIA_REGIONS: &[&str] = &["WA", "NT", "SA", "Q", "NSW", "V", "T"];

pub const AUSTRALIA_BORDERS: &[(&str, &str)] = &[
    ("WA", "NT"),
    ("WA", "SA"),
    ("NT", "SA"),
    ("NT", "Q"),
    ("SA", "Q"),
    ("SA", "NSW"),
    ("SA", "V"),
    ("Q", "NSW"),
    ("NSW", "V"),
];

/// Colour `regions` with `colors` so that bordering regions differ.
#[must_use]
pub fn coloring(regions: &[&str], borders: &[(&str, &str)], colors: &[&str]) -> CspProblemV1 {
    let problem = regions.iter().fold(CspProblemV1::new(), |p, region| {
        p.with_variable(*region, colors.iter().copied())
    });
    borders
        .iter()
        .fold(problem, |p, &(a, b)| p.with_constraint(ConstraintKind::NotEqual, [a, b]))
}

#[must_use]
pub fn australia() -> CspProblemV1 {
    coloring(AUSTRALIA_REGIONS, AUSTRALIA_BORDERS, RGB)
}

/// Ring of `n` regions `c0 .. c{n-1}`, each bordering the next.
#[must_use]
pub fn cycle(n: usize, colors: &[&str]) -> CspProblemV1 {
    let names: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
    let regions: Vec<&str> = names.iter().map(String::as_str).collect();
    let borders: Vec<(&str, &str)> = (0..n).map(|i| (regions[i], regions[(i + 1) % n])).collect();
    coloring(&regions, &borders, colors)
}

/// Every pair of `n` regions borders.
#[must_use]
pub fn complete(n: usize, colors: &[&str]) -> CspProblemV1 {
    let names: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
    let regions: Vec<&str> = names.iter().map(String::as_str).collect();
    let borders: Vec<(&str, &str)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .map(|(i, j)| (regions[i], regions[j]))
        .collect();
    coloring(&regions, &borders, colors)
}
