//! N queens: one variable per column holding the queen's row.
//!
//! Two forms of the same problem. [`queens`] builds a `Csp<usize>` with a
//! predicate constraint per column pair; [`queens_problem`] spells the
//! constraints out as `allowed_pairs` tables so the harness can run it from
//! a problem file.

use wayfind_search::csp::{BinaryPredicate, Csp, VarId};
use wayfind_search::ModelError;

use crate::problem::CspProblemV1;

fn column(i: usize) -> String {
    format!("q{i}")
}

/// Queens in columns `i` and `j` at rows `ri` and `rj` do not attack.
#[must_use]
pub fn compatible(i: usize, j: usize, ri: usize, rj: usize) -> bool {
    ri != rj && ri.abs_diff(rj) != i.abs_diff(j)
}

/// `n` queens with predicate constraints.
///
/// # Errors
///
/// Never for `n >= 1`; the builder calls are fallible.
pub fn queens(n: usize) -> Result<Csp<usize>, ModelError> {
    let mut csp = Csp::new();
    let vars: Vec<VarId> = (0..n)
        .map(|i| csp.add_variable(column(i), 0..n))
        .collect::<Result<_, _>>()?;
    for i in 0..n {
        for j in i + 1..n {
            let name = format!("{} safe from {}", column(i), column(j));
            csp.add_constraint(BinaryPredicate::new(vars[i], vars[j], name, move |ri: &usize, rj: &usize| {
                compatible(i, j, *ri, *rj)
            }))?;
        }
    }
    Ok(csp)
}

/// `n` queens as a problem file with explicit pair tables.
#[must_use]
pub fn queens_problem(n: usize) -> CspProblemV1 {
    let mut problem = (0..n).fold(CspProblemV1::new(), |p, i| p.with_variable(column(i), 0..n));
    for i in 0..n {
        for j in i + 1..n {
            let pairs: Vec<(usize, usize)> = (0..n)
                .flat_map(|ri| (0..n).map(move |rj| (ri, rj)))
                .filter(|&(ri, rj)| compatible(i, j, ri, rj))
                .collect();
            problem = problem.with_allowed_pairs(column(i), column(j), pairs);
        }
    }
    problem
}
