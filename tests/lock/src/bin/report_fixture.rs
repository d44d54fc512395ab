//! Runs every bundled world with a trace and prints one line per world for
//! cross-process comparison.
//!
//! Usage: `report_fixture`
//! Output: `<world> status=<status> report=<digest> trace=<digest> bundle=<digest>`

use wayfind_harness::runner::{run_problem, RunConfig};
use wayfind_harness::worlds::World;
use wayfind_kernel::hash::{canonical_hash, HashDomain};
use wayfind_search::SearchPolicyV1;

fn main() {
    let config = RunConfig {
        policy: SearchPolicyV1::default().with_trace(),
        ..RunConfig::default()
    };
    for world in World::ALL {
        let problem = world.problem().expect("bundled world builds");
        let output = run_problem(&problem, &config).expect("bundled world runs");
        let trace = output.trace.as_deref().expect("trace recorded");
        let bundle = output.to_bundle().expect("bundle seals");
        println!(
            "{world} status={} report={} trace={} bundle={}",
            output.status,
            output.report_digest(),
            canonical_hash(HashDomain::SearchTrace, trace),
            bundle.digest,
        );
    }
}
