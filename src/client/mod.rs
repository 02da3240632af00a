//! Typed governance client.
//!
//! [`ChainClient`] is the seam to whatever actually carries messages to the
//! contract: a signing RPC client in production, [`LocalChain`] in process.
//! [`GovQueryClient`] and [`GovClient`] turn method calls into `QueryMsg` /
//! `ExecuteMsg` JSON and decode the answers.

pub mod local;

pub use local::LocalChain;

use crate::actions::Action;
use crate::governance::{
    ErrorKind, Expiration, GovernanceError, Member, ProposalResponse, Receipt, ThresholdResponse,
    Vote,
};
use crate::msg::{
    ExecuteMsg, GroupResponse, Metadata, ProposalListResponse, QueryMsg, VoteListResponse,
    VoteResponse, VoterListResponse, VoterResponse,
};
use crate::serialization::{from_json, to_json, SerializationError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unknown contract {0}")]
    UnknownContract(String),

    /// The contract refused the call.
    #[error("contract error: {0}")]
    Contract(#[from] GovernanceError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Logical kind of a contract refusal.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Contract(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Smart-contract query/execute transport.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Run a JSON smart query, returning the JSON response.
    async fn query_smart(&self, contract: &str, msg: &[u8]) -> ClientResult<Vec<u8>>;

    /// Submit a JSON execute message on behalf of `sender`.
    async fn execute(&self, sender: &str, contract: &str, msg: &[u8]) -> ClientResult<Receipt>;
}

/// Read-only view of one governance contract.
pub struct GovQueryClient<C> {
    client: Arc<C>,
    contract: String,
}

impl<C> Clone for GovQueryClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            contract: self.contract.clone(),
        }
    }
}

impl<C: ChainClient> GovQueryClient<C> {
    pub fn new(client: Arc<C>, contract: impl Into<String>) -> Self {
        Self {
            client,
            contract: contract.into(),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    async fn query<T: DeserializeOwned>(&self, msg: &QueryMsg) -> ClientResult<T> {
        let msg = to_json(msg)?;
        let bytes = self.client.query_smart(&self.contract, &msg).await?;
        Ok(from_json(&bytes)?)
    }

    pub async fn threshold(&self) -> ClientResult<ThresholdResponse> {
        self.query(&QueryMsg::Threshold {}).await
    }

    pub async fn proposal(&self, proposal_id: u64) -> ClientResult<ProposalResponse> {
        self.query(&QueryMsg::Proposal { proposal_id }).await
    }

    pub async fn list_proposals(
        &self,
        start_after: Option<u64>,
        limit: Option<u32>,
    ) -> ClientResult<ProposalListResponse> {
        let msg = QueryMsg::ListProposals { start_after, limit };
        self.query(&msg).await
    }

    pub async fn reverse_proposals(
        &self,
        start_before: Option<u64>,
        limit: Option<u32>,
    ) -> ClientResult<ProposalListResponse> {
        self.query(&QueryMsg::ReverseProposals {
            start_before,
            limit,
        })
        .await
    }

    pub async fn vote(&self, proposal_id: u64, voter: &str) -> ClientResult<VoteResponse> {
        self.query(&QueryMsg::Vote {
            proposal_id,
            voter: voter.to_string(),
        })
        .await
    }

    pub async fn list_votes(
        &self,
        proposal_id: u64,
        start_after: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<VoteListResponse> {
        self.query(&QueryMsg::ListVotes {
            proposal_id,
            start_after: start_after.map(str::to_string),
            limit,
        })
        .await
    }

    pub async fn voter(&self, address: &str) -> ClientResult<VoterResponse> {
        self.query(&QueryMsg::Voter {
            address: address.to_string(),
        })
        .await
    }

    pub async fn list_voters(
        &self,
        start_after: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<VoterListResponse> {
        self.query(&QueryMsg::ListVoters {
            start_after: start_after.map(str::to_string),
            limit,
        })
        .await
    }

    pub async fn reverse_voters(
        &self,
        start_before: Option<&str>,
        limit: Option<u32>,
    ) -> ClientResult<VoterListResponse> {
        self.query(&QueryMsg::ReverseVoters {
            start_before: start_before.map(str::to_string),
            limit,
        })
        .await
    }

    pub async fn group(&self) -> ClientResult<GroupResponse> {
        self.query(&QueryMsg::Group {}).await
    }

    pub async fn metadata(&self) -> ClientResult<Metadata> {
        self.query(&QueryMsg::Metadata {}).await
    }
}

/// Signing view of one governance contract, bound to a sender address.
pub struct GovClient<C> {
    queries: GovQueryClient<C>,
    sender: String,
}

impl<C: ChainClient> GovClient<C> {
    pub fn new(client: Arc<C>, contract: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            queries: GovQueryClient::new(client, contract),
            sender: sender.into(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn queries(&self) -> &GovQueryClient<C> {
        &self.queries
    }

    async fn submit(&self, msg: &ExecuteMsg) -> ClientResult<Receipt> {
        self.queries
            .client
            .execute(&self.sender, &self.queries.contract, &to_json(msg)?)
            .await
    }

    pub async fn propose(
        &self,
        title: &str,
        description: &str,
        msgs: Vec<Action>,
        latest: Option<Expiration>,
    ) -> ClientResult<Receipt> {
        self.submit(&ExecuteMsg::Propose {
            title: title.to_string(),
            description: description.to_string(),
            msgs,
            latest,
        })
        .await
    }

    pub async fn vote(&self, proposal_id: u64, vote: Vote) -> ClientResult<Receipt> {
        self.submit(&ExecuteMsg::Vote { proposal_id, vote }).await
    }

    pub async fn execute(&self, proposal_id: u64) -> ClientResult<Receipt> {
        self.submit(&ExecuteMsg::Execute { proposal_id }).await
    }

    pub async fn close(&self, proposal_id: u64) -> ClientResult<Receipt> {
        self.submit(&ExecuteMsg::Close { proposal_id }).await
    }

    pub async fn update_metadata(&self, metadata: Metadata) -> ClientResult<Receipt> {
        self.submit(&ExecuteMsg::UpdateMetadata {
            name: metadata.name,
            description: metadata.description,
            image: metadata.image,
        })
        .await
    }

    pub async fn update_members(
        &self,
        add: Vec<Member>,
        remove: Vec<String>,
    ) -> ClientResult<Receipt> {
        self.submit(&ExecuteMsg::UpdateMembers { add, remove }).await
    }
}
