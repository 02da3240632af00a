//! `dao-gov version`: build and compatibility details.

use dao_gov::governance::{DEFAULT_LIMIT, MAX_LIMIT};
use dao_gov::serialization::SNAPSHOT_VERSION;

pub fn execute() {
    print!("{}", report());
}

/// What an operator needs to match a deployment against this build.
fn report() -> String {
    format!(
        "dao-gov {}\n\
         snapshot format: v{}\n\
         query page size: {} (max {})\n",
        env!("CARGO_PKG_VERSION"),
        SNAPSHOT_VERSION,
        DEFAULT_LIMIT,
        MAX_LIMIT,
    )
}
