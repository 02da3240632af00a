//! Query/execute protocol.
//!
//! JSON shapes follow the contract convention: snake_case, externally tagged
//! enums, unit-like variants as empty objects (`{"threshold": {}}`), integers
//! too large for JSON numbers as strings.

use crate::actions::Action;
use crate::governance::{
    Duration, Executor, Expiration, Member, ProposalResponse, Threshold, Vote, VoteInfo,
};
use serde::{Deserialize, Serialize};

/// Construction parameters of a governance instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiateMsg {
    /// Address of the backing group registry.
    pub group_addr: String,
    pub members: Vec<Member>,
    pub threshold: Threshold,
    pub max_voting_period: Duration,
    /// Who may execute passed proposals; `None` means anyone.
    #[serde(default)]
    pub executor: Option<Executor>,
    /// Record the proposer's ballot as Yes when a proposal is created.
    #[serde(default)]
    pub proposer_votes_yes: bool,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    Propose {
        title: String,
        description: String,
        msgs: Vec<Action>,
        #[serde(default)]
        latest: Option<Expiration>,
    },
    Vote {
        proposal_id: u64,
        vote: Vote,
    },
    Execute {
        proposal_id: u64,
    },
    Close {
        proposal_id: u64,
    },
    UpdateMetadata {
        name: String,
        description: String,
        image: String,
    },
    UpdateMembers {
        #[serde(default)]
        add: Vec<Member>,
        #[serde(default)]
        remove: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// Returns `ThresholdResponse`.
    Threshold {},
    /// Returns `ProposalResponse`.
    Proposal { proposal_id: u64 },
    /// Returns `ProposalListResponse`.
    ListProposals {
        #[serde(default)]
        start_after: Option<u64>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Returns `ProposalListResponse`.
    ReverseProposals {
        #[serde(default)]
        start_before: Option<u64>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Returns `VoteResponse`.
    Vote { proposal_id: u64, voter: String },
    /// Returns `VoteListResponse`.
    ListVotes {
        proposal_id: u64,
        #[serde(default)]
        start_after: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Returns `VoterResponse`.
    Voter { address: String },
    /// Returns `VoterListResponse`.
    ListVoters {
        #[serde(default)]
        start_after: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Returns `VoterListResponse`.
    ReverseVoters {
        #[serde(default)]
        start_before: Option<String>,
        #[serde(default)]
        limit: Option<u32>,
    },
    /// Returns `GroupResponse`.
    Group {},
    /// Returns `Metadata`.
    Metadata {},
}

/// DAO display metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub vote: Option<VoteInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteListResponse {
    pub votes: Vec<VoteInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterResponse {
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDetail {
    pub addr: String,
    pub weight: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterListResponse {
    pub voters: Vec<VoterDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResponse {
    pub group: String,
    pub total_weight: u64,
    pub revision: u64,
}
