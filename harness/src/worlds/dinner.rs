//! A small AND-OR plan: hosting dinner.
//!
//! ```text
//! host_dinner --AND--> cook, clean_up
//! host_dinner --OR---> order_takeout
//! cook        --AND--> buy_food, prepare
//! buy_food    --OR---> market, delivery
//! market      --OR---> done
//! delivery    --OR---> pay_card
//! prepare     --OR---> done
//! clean_up    --OR---> done
//! order_takeout --OR-> pay_card
//! pay_card    (no branches: the card is declined)
//! ```
//!
//! Takeout and delivery both dead-end at `pay_card`, so the only plan cooks
//! with food from the market. Under unit step costs it costs 8.

use crate::problem::{AndOrProblemV1, BranchKindSpec};

pub const GOAL: &str = "done";

#[must_use]
pub fn dinner() -> AndOrProblemV1 {
    use BranchKindSpec::{And, Or};
    AndOrProblemV1::new("host_dinner", GOAL)
        .with_branch("host_dinner", And, ["cook", "clean_up"])
        .with_branch("host_dinner", Or, ["order_takeout"])
        .with_branch("cook", And, ["buy_food", "prepare"])
        .with_branch("buy_food", Or, ["market", "delivery"])
        .with_branch("market", Or, [GOAL])
        .with_branch("delivery", Or, ["pay_card"])
        .with_branch("prepare", Or, [GOAL])
        .with_branch("clean_up", Or, [GOAL])
        .with_branch("order_takeout", Or, ["pay_card"])
}
