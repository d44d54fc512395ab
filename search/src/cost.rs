//! Path cost arithmetic with a total order.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A non-negative path or edge cost.
///
/// Wraps `f64` and orders with [`f64::total_cmp`] so costs can key a
/// `BinaryHeap`. [`Cost::INFINITY`] marks unreachable / dead-end values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cost(f64);

impl Cost {
    pub const ZERO: Cost = Cost(0.0);
    pub const ONE: Cost = Cost(1.0);
    pub const INFINITY: Cost = Cost(f64::INFINITY);

    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// True for finite values `>= 0` (the only costs an edge may carry).
    #[must_use]
    pub fn is_valid_edge_cost(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

impl From<f64> for Cost {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<u32> for Cost {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost(self.0 + rhs.0)
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Cost {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_infinite() {
            f.write_str("inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
