//! Proposal records and status derivation.
//!
//! Status is never stored. A proposal keeps its tally, its threshold and
//! total-weight snapshots, its expiration and two terminal flags; the status
//! reported to callers is recomputed from those on every read.

use super::ballots::Votes;
use super::expiration::{BlockInfo, Expiration};
use super::threshold::{evaluate, Threshold, ThresholdResponse, Verdict};
use crate::actions::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived proposal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Voting window open, threshold not (yet) met.
    Open,
    /// Threshold met; executable, also after expiry.
    Passed,
    /// Expired without passing.
    Rejected,
    Executed,
    /// Explicitly closed after being rejected.
    Closed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Open => "open",
            Status::Passed => "passed",
            Status::Rejected => "rejected",
            Status::Executed => "executed",
            Status::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub proposer: String,
    pub title: String,
    pub description: String,
    pub actions: Vec<Action>,
    pub start_height: u64,
    /// Registry revision voter weights are read at.
    pub registry_revision: u64,
    pub expires: Expiration,
    pub threshold: Threshold,
    pub total_weight: u64,
    pub votes: Votes,
    #[serde(default)]
    pub executed: bool,
    #[serde(default)]
    pub closed: bool,
}

impl Proposal {
    pub fn is_expired(&self, block: &BlockInfo) -> bool {
        self.expires.is_expired(block)
    }

    pub fn current_status(&self, block: &BlockInfo) -> Status {
        self.status_with(&self.votes, block)
    }

    /// Status the proposal would have with `votes` as its tally.
    pub(crate) fn status_with(&self, votes: &Votes, block: &BlockInfo) -> Status {
        if self.executed {
            return Status::Executed;
        }
        if self.closed {
            return Status::Closed;
        }

        let expired = self.is_expired(block);
        match evaluate(votes, self.total_weight, &self.threshold, expired) {
            Ok(Verdict::Passed) => Status::Passed,
            Ok(Verdict::Rejected) => Status::Rejected,
            Ok(Verdict::Pending) => Status::Open,
            // creation refuses zero-weight groups; only a damaged snapshot gets here
            Err(_) if expired => Status::Rejected,
            Err(_) => Status::Open,
        }
    }

    pub fn to_response(&self, block: &BlockInfo) -> ProposalResponse {
        ProposalResponse {
            id: self.id,
            proposer: self.proposer.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            msgs: self.actions.clone(),
            status: self.current_status(block),
            expires: self.expires,
            threshold: self.threshold.to_response(self.total_weight),
            votes: self.votes,
        }
    }
}

/// Proposal as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub id: u64,
    pub proposer: String,
    pub title: String,
    pub description: String,
    pub msgs: Vec<Action>,
    pub status: Status,
    pub expires: Expiration,
    pub threshold: ThresholdResponse,
    pub votes: Votes,
}
