//! dao-gov - Weighted DAO governance engine
//!
//! Members propose batches of chain actions, vote on them with weighted
//! ballots, and execute the batch atomically once it passes.
//!
//! Key principles:
//! - Proposal status is derived from the tally on every read, never stored
//! - Threshold and total weight are snapshotted when a proposal opens
//! - A failed call leaves the engine exactly as it was
//! - Percentages are compared with exact fixed-point arithmetic

pub mod actions;
pub mod client;
pub mod contract;
pub mod governance;
pub mod msg;
pub mod serialization;
