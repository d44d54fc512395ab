//! Backtracking search with conflict-directed backjumping.
//!
//! The solver keeps an explicit stack of frames, one per assigned variable
//! plus one for the variable currently being tried. Each frame owns the
//! variable's ordered candidate values, the next candidate to try, and the
//! variable's conflict set: the earlier variables blamed for its rejected
//! values and for failures below it.
//!
//! When a frame runs out of values, chronological backtracking resumes the
//! previous frame. Conflict-directed backjumping resumes the frame of the
//! most recently assigned variable in the conflict set instead, discards
//! every frame in between, and hands the remaining conflicts to the target.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::csp::model::{Assignment, Csp, PartialAssignment, VarId};
use crate::error::SearchError;
use crate::outcome::{Outcome, SearchRun, SearchStats};
use crate::policy::{BudgetMeter, SearchPolicyV1};

/// How to resume after a variable runs out of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backtracking {
    /// Undo the most recent assignment.
    Chronological,
    /// Jump to the most recent variable in the conflict set.
    #[default]
    ConflictDirected,
}

/// Which unassigned variable to branch on next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariableOrder {
    /// Fewest values consistent with the current assignment; ties go to the
    /// variable sharing more constraints with unassigned variables, then to
    /// declaration order.
    #[default]
    Mrv,
    /// Declaration order.
    Static,
}

/// In which order to try a variable's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueOrder {
    /// Least-constraining value first: ascending number of neighbour values
    /// ruled out. Stable, so ties keep domain order.
    #[default]
    Lcv,
    /// Domain order.
    Domain,
}

/// Solver switches. `Default` is CBJ with MRV and LCV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CspOptions {
    pub backtracking: Backtracking,
    pub variable_order: VariableOrder,
    pub value_order: ValueOrder,
}

impl CspOptions {
    /// Plain chronological backtracking over declaration and domain order.
    #[must_use]
    pub fn chronological() -> Self {
        Self {
            backtracking: Backtracking::Chronological,
            variable_order: VariableOrder::Static,
            value_order: ValueOrder::Domain,
        }
    }
}

/// One step of CSP search, recorded when `record_trace` is on.
#[derive(Debug, Clone, PartialEq)]
pub enum CspEvent<V> {
    /// `var = value` was consistent and is now assigned at `depth`.
    Assign { var: VarId, value: V, depth: usize },
    /// `var = value` violated a constraint blamed on `culprits`.
    Reject {
        var: VarId,
        value: V,
        culprits: Vec<VarId>,
    },
    /// `from` ran out of values; search resumes at `to` (`None` = give up).
    Backtrack {
        from: VarId,
        to: Option<VarId>,
        levels_skipped: usize,
    },
}

struct Frame<V> {
    var: VarId,
    values: Vec<V>,
    next: usize,
    conflicts: BTreeSet<VarId>,
}

/// Solve `csp`, returning a complete consistent assignment if one exists.
///
/// Every value trial counts as one expansion; `max_expansions` bounds the
/// number of trials. Variable selections count as generated nodes.
///
/// # Errors
///
/// [`SearchError::InvalidPolicy`] for degenerate budgets;
/// [`SearchError::InvalidModel`] when a variable has an empty domain.
pub fn solve<V>(
    csp: &Csp<V>,
    options: CspOptions,
    policy: &SearchPolicyV1,
) -> Result<SearchRun<Assignment<V>, CspEvent<V>>, SearchError>
where
    V: Clone + PartialEq + Debug,
{
    policy.validate()?;
    csp.validate()?;

    let meter = BudgetMeter::start(policy);
    let mut solver = Solver {
        csp,
        options,
        assignment: PartialAssignment::new(csp.len()),
        stats: SearchStats::default(),
        trace: Vec::new(),
        record_trace: policy.record_trace,
    };
    let outcome = solver.run(&meter);
    tracing::debug!(
        algorithm = "csp",
        backtracking = ?options.backtracking,
        solved = outcome.is_solved(),
        trials = solver.stats.expansions,
        backjumps = solver.stats.backjumps,
        "search finished"
    );
    Ok(SearchRun {
        outcome,
        stats: solver.stats,
        trace: solver.trace,
    })
}

struct Solver<'c, V> {
    csp: &'c Csp<V>,
    options: CspOptions,
    assignment: PartialAssignment<V>,
    stats: SearchStats,
    trace: Vec<CspEvent<V>>,
    record_trace: bool,
}

impl<V: Clone + PartialEq + Debug> Solver<'_, V> {
    fn run(&mut self, meter: &BudgetMeter<'_>) -> Outcome<Assignment<V>> {
        let mut frames: Vec<Frame<V>> = Vec::new();
        match self.open_frame() {
            Some(frame) => frames.push(frame),
            None => return Outcome::Solved(self.complete()),
        }

        loop {
            if let Some(budget) = meter.exhausted(&self.stats) {
                return Outcome::ResourceExhausted(budget);
            }
            let depth = frames.len() - 1;
            let frame = &mut frames[depth];

            if frame.next < frame.values.len() {
                let value = frame.values[frame.next].clone();
                frame.next += 1;
                self.stats.expansions += 1;
                let var = frame.var;
                match self.violation(var, &value) {
                    Some(culprits) => {
                        frame.conflicts.extend(culprits.iter().copied());
                        self.record(CspEvent::Reject {
                            var,
                            value,
                            culprits,
                        });
                    }
                    None => {
                        self.assignment.assign(var, value.clone());
                        self.record(CspEvent::Assign { var, value, depth });
                        match self.open_frame() {
                            Some(next) => frames.push(next),
                            None => return Outcome::Solved(self.complete()),
                        }
                    }
                }
                continue;
            }

            // `frame.var` has no values left.
            let Some(dead) = frames.pop() else {
                return Outcome::NoSolution;
            };
            let target = match self.options.backtracking {
                Backtracking::Chronological => frames.len().checked_sub(1),
                Backtracking::ConflictDirected => frames
                    .iter()
                    .rposition(|f| dead.conflicts.contains(&f.var)),
            };
            let Some(target) = target else {
                self.record(CspEvent::Backtrack {
                    from: dead.var,
                    to: None,
                    levels_skipped: 0,
                });
                return Outcome::NoSolution;
            };

            let skipped = frames.len() - 1 - target;
            for discarded in frames.drain(target + 1..).rev() {
                self.assignment.unassign(discarded.var);
            }
            let resumed = &mut frames[target];
            self.assignment.unassign(resumed.var);
            if self.options.backtracking == Backtracking::ConflictDirected {
                let var = resumed.var;
                resumed
                    .conflicts
                    .extend(dead.conflicts.iter().copied().filter(|&v| v != var));
            }

            self.stats.backtracks += 1;
            if skipped > 0 {
                self.stats.backjumps += 1;
                self.stats.levels_skipped += skipped as u64;
            }
            tracing::trace!(from = %dead.var, to = %resumed.var, skipped, "backtrack");
            let to = resumed.var;
            self.record(CspEvent::Backtrack {
                from: dead.var,
                to: Some(to),
                levels_skipped: skipped,
            });
        }
    }

    fn record(&mut self, event: CspEvent<V>) {
        if self.record_trace {
            self.trace.push(event);
        }
    }

    fn complete(&self) -> Assignment<V> {
        let values = self
            .csp
            .variables()
            .filter_map(|v| self.assignment.get(v).cloned())
            .collect();
        Assignment::new(self.csp.names().to_vec(), values)
    }

    /// Select the next variable and order its values; `None` once every
    /// variable is assigned.
    fn open_frame(&mut self) -> Option<Frame<V>> {
        let var = self.select_variable()?;
        self.stats.generated += 1;
        self.stats.observe_depth(u32::try_from(self.assignment.len()).unwrap_or(u32::MAX));
        let values = self.order_values(var);
        Some(Frame {
            var,
            values,
            next: 0,
            conflicts: BTreeSet::new(),
        })
    }

    /// `None` when `var = value` is consistent with the current assignment.
    /// Otherwise the other assigned variables of the violated constraint
    /// whose most recently assigned member is the oldest, oldest first.
    fn violation(&mut self, var: VarId, value: &V) -> Option<Vec<VarId>> {
        let csp = self.csp;
        self.assignment.assign(var, value.clone());
        let mut blame: Option<(Option<usize>, Vec<VarId>)> = None;
        for constraint in csp.constraints_on(var) {
            if constraint.is_consistent(&self.assignment) {
                continue;
            }
            let mut culprits: Vec<VarId> = constraint
                .scope()
                .iter()
                .copied()
                .filter(|&v| v != var && self.assignment.is_assigned(v))
                .collect();
            culprits.sort_by_key(|&v| self.assignment.depth_of(v));
            culprits.dedup();
            let latest = culprits.last().and_then(|&v| self.assignment.depth_of(v));
            if blame.as_ref().map_or(true, |(best, _)| latest < *best) {
                blame = Some((latest, culprits));
            }
        }
        self.assignment.unassign(var);
        blame.map(|(_, culprits)| culprits)
    }

    fn consistent_with(&mut self, var: VarId, value: &V) -> bool {
        self.assignment.assign(var, value.clone());
        let ok = self
            .csp
            .constraints_on(var)
            .all(|c| c.is_consistent(&self.assignment));
        self.assignment.unassign(var);
        ok
    }

    fn select_variable(&mut self) -> Option<VarId> {
        let csp = self.csp;
        let mut unassigned = csp.variables().filter(|&v| !self.assignment.is_assigned(v));
        match self.options.variable_order {
            VariableOrder::Static => unassigned.next(),
            VariableOrder::Mrv => {
                let candidates: Vec<VarId> = unassigned.collect();
                let mut best: Option<(usize, std::cmp::Reverse<usize>, VarId)> = None;
                for var in candidates {
                    let remaining = csp
                        .domain(var)
                        .iter()
                        .filter(|value| self.consistent_with(var, value))
                        .count();
                    let degree = csp
                        .constraints_on(var)
                        .filter(|c| {
                            c.scope()
                                .iter()
                                .any(|&v| v != var && !self.assignment.is_assigned(v))
                        })
                        .count();
                    let key = (remaining, std::cmp::Reverse(degree), var);
                    if best.as_ref().map_or(true, |b| key < *b) {
                        best = Some(key);
                    }
                }
                best.map(|(_, _, var)| var)
            }
        }
    }

    fn order_values(&mut self, var: VarId) -> Vec<V> {
        let csp = self.csp;
        let domain = csp.domain(var).to_vec();
        if self.options.value_order == ValueOrder::Domain {
            return domain;
        }
        let neighbors: Vec<VarId> = csp
            .neighbors(var)
            .into_iter()
            .filter(|&n| !self.assignment.is_assigned(n))
            .collect();
        let mut scored: Vec<(usize, V)> = domain
            .into_iter()
            .map(|value| {
                self.assignment.assign(var, value.clone());
                let ruled_out = neighbors
                    .iter()
                    .map(|&n| {
                        csp.domain(n)
                            .iter()
                            .filter(|w| !self.consistent_with(n, w))
                            .count()
                    })
                    .sum();
                self.assignment.unassign(var);
                (ruled_out, value)
            })
            .collect();
        scored.sort_by_key(|(ruled_out, _)| *ruled_out);
        scored.into_iter().map(|(_, value)| value).collect()
    }
}
