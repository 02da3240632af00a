//! DAO governance core.
//!
//! Proposal lifecycle over a weighted member registry:
//! - `registry`: weighted members, checkpointed by revision
//! - `threshold` / `decimal`: pass/fail arithmetic with exact fixed-point ratios
//! - `expiration`: voting windows
//! - `ballots`: one ballot per (proposal, voter), tally bookkeeping
//! - `proposal`: records and derived status
//! - `executor`: who may execute
//! - `engine`: the state machine tying these together

pub mod ballots;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod executor;
pub mod expiration;
pub mod proposal;
pub mod receipt;
pub mod registry;
pub mod threshold;

#[cfg(test)]
mod proptests;

pub use ballots::{Ballot, Vote, VoteInfo, VoteLedger, Votes};
pub use decimal::{Decimal, Uint128};
pub use engine::{Config, Governance, DEFAULT_LIMIT, MAX_LIMIT};
pub use error::{ErrorKind, GovernanceError, GovernanceResult};
pub use executor::Executor;
pub use expiration::{is_expired, BlockInfo, Duration, Expiration};
pub use proposal::{Proposal, ProposalResponse, Status};
pub use receipt::{Attribute, Receipt};
pub use registry::{Member, Registry};
pub use threshold::{evaluate, Threshold, ThresholdError, ThresholdResponse, Verdict};
