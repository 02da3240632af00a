//! Governance engine.
//!
//! Owns the registry, the proposal store, the vote ledger and the execution
//! environment, and applies every state-changing call as a single transition:
//! all checks run first and the new state is committed only after the call's
//! receipt has been sealed. A failed call leaves the engine exactly as it was.
//!
//! The engine does no locking. Callers serialize state-changing calls and may
//! run queries concurrently with each other (see `client::LocalChain`).

use super::ballots::{Ballot, Vote, VoteLedger};
use super::error::{GovernanceError, GovernanceResult};
use super::executor::{authorize, authorize_admin, Executor};
use super::expiration::{BlockInfo, Duration, Expiration};
use super::proposal::{Proposal, ProposalResponse, Status};
use super::receipt::Receipt;
use super::registry::{Member, Registry};
use super::threshold::{Threshold, ThresholdResponse};
use crate::actions::{apply_batch, Action, ExecutionEnvironment};
use crate::msg::{
    GroupResponse, InstantiateMsg, Metadata, ProposalListResponse, VoteListResponse, VoteResponse,
    VoterDetail, VoterListResponse, VoterResponse,
};
use crate::serialization::{decode_snapshot, encode_snapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::{debug, info, warn};

/// Page size when a query does not set `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page a query may request.
pub const MAX_LIMIT: u32 = 30;

fn page_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize
}

/// Voting configuration fixed at instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub threshold: Threshold,
    pub max_voting_period: Duration,
    #[serde(default)]
    pub executor: Option<Executor>,
    #[serde(default)]
    pub proposer_votes_yes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Governance<E> {
    group: String,
    config: Config,
    registry: Registry,
    proposals: BTreeMap<u64, Proposal>,
    ballots: VoteLedger,
    next_proposal_id: u64,
    #[serde(default)]
    metadata: Metadata,
    environment: E,
}

impl<E: ExecutionEnvironment> Governance<E> {
    pub fn instantiate(msg: InstantiateMsg, environment: E) -> GovernanceResult<Self> {
        if msg.group_addr.trim().is_empty() {
            return Err(GovernanceError::EmptyAddress);
        }
        if msg.max_voting_period.is_zero() {
            return Err(GovernanceError::InvalidVotingPeriod);
        }
        if let Some(executor) = &msg.executor {
            executor.validate()?;
        }
        let metadata = match msg.metadata {
            Some(metadata) if metadata.name.trim().is_empty() => {
                return Err(GovernanceError::EmptyName)
            }
            Some(metadata) => metadata,
            None => Metadata::default(),
        };

        let registry = Registry::new(msg.members)?;
        msg.threshold.validate(registry.total_weight())?;

        info!(
            group = %msg.group_addr,
            members = registry.len(),
            total_weight = registry.total_weight(),
            "governance instantiated"
        );

        Ok(Self {
            group: msg.group_addr,
            config: Config {
                threshold: msg.threshold,
                max_voting_period: msg.max_voting_period,
                executor: msg.executor,
                proposer_votes_yes: msg.proposer_votes_yes,
            },
            registry,
            proposals: BTreeMap::new(),
            ballots: VoteLedger::new(),
            next_proposal_id: 1,
            metadata,
            environment,
        })
    }

    /// Open a proposal. The receipt carries the new `proposal_id`.
    pub fn propose(
        &mut self,
        block: &BlockInfo,
        sender: &str,
        title: String,
        description: String,
        actions: Vec<Action>,
        latest: Option<Expiration>,
    ) -> GovernanceResult<Receipt> {
        if title.trim().is_empty() {
            return Err(GovernanceError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(GovernanceError::EmptyDescription);
        }
        if actions.is_empty() {
            return Err(GovernanceError::EmptyActionList);
        }
        for (index, action) in actions.iter().enumerate() {
            action
                .validate()
                .map_err(|source| GovernanceError::InvalidAction { index, source })?;
        }

        // zero-weight members may propose, strangers may not
        let proposer_weight = self
            .registry
            .weight(sender)
            .ok_or(GovernanceError::Unauthorized)?;

        let total_weight = self.registry.total_weight();
        self.config.threshold.validate(total_weight)?;

        let expires = self.expiration_for(block, latest)?;

        let id = self.next_proposal_id;
        let mut proposal = Proposal {
            id,
            proposer: sender.to_string(),
            title,
            description,
            actions,
            start_height: block.height,
            registry_revision: self.registry.revision(),
            expires,
            threshold: self.config.threshold.clone(),
            total_weight,
            votes: Default::default(),
            executed: false,
            closed: false,
        };

        // a zero-weight proposer has no ballot to cast
        let auto_yes = self.config.proposer_votes_yes && proposer_weight > 0;
        let proposer_ballot = auto_yes.then_some(Ballot {
            weight: proposer_weight,
            vote: Vote::Yes,
        });
        if let Some(ballot) = proposer_ballot {
            proposal.votes.add_vote(ballot.vote, ballot.weight);
        }

        let status = proposal.current_status(block);
        let receipt = Receipt::new("propose")
            .add_attribute("sender", sender)
            .add_attribute("proposal_id", id)
            .add_attribute("status", status)
            .seal(block)?;

        if let Some(ballot) = proposer_ballot {
            let mut tally = Default::default();
            self.ballots.cast(id, sender, ballot, &mut tally);
        }
        self.proposals.insert(id, proposal);
        self.next_proposal_id += 1;

        info!(proposal_id = id, sender, %expires, %status, "proposal created");
        Ok(receipt)
    }

    pub fn vote(
        &mut self,
        block: &BlockInfo,
        sender: &str,
        proposal_id: u64,
        vote: Vote,
    ) -> GovernanceResult<Receipt> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;

        if proposal.executed || proposal.closed {
            return Err(GovernanceError::ProposalNotOpen(proposal_id));
        }
        if proposal.is_expired(block) {
            return Err(GovernanceError::Expired(proposal_id));
        }

        let weight = self
            .registry
            .weight_at(sender, proposal.registry_revision)
            .filter(|w| *w > 0)
            .ok_or_else(|| GovernanceError::NotAMember(sender.to_string()))?;

        let ballot = Ballot { weight, vote };
        let tally = self
            .ballots
            .preview(proposal_id, sender, ballot, &proposal.votes);
        let status = proposal.status_with(&tally, block);

        let receipt = Receipt::new("vote")
            .add_attribute("sender", sender)
            .add_attribute("proposal_id", proposal_id)
            .add_attribute("status", status)
            .seal(block)?;

        if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
            let replaced = self
                .ballots
                .cast(proposal_id, sender, ballot, &mut proposal.votes);
            if let Some(old) = replaced {
                debug!(proposal_id, sender, previous = %old.vote, "ballot replaced");
            }
        }

        info!(proposal_id, sender, %vote, weight, %status, "vote recorded");
        Ok(receipt)
    }

    /// Apply a passed proposal's actions, all or nothing.
    pub fn execute(
        &mut self,
        block: &BlockInfo,
        sender: &str,
        proposal_id: u64,
    ) -> GovernanceResult<Receipt> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;

        if proposal.current_status(block) != Status::Passed {
            return Err(GovernanceError::WrongExecuteState);
        }
        authorize(self.config.executor.as_ref(), &self.registry, sender)?;

        let mut environment = self.environment.clone();
        let effects = apply_batch(&mut environment, &proposal.actions).map_err(|err| {
            warn!(proposal_id, index = err.index, error = %err.source, "execution failed");
            GovernanceError::ExecutionFailed {
                proposal_id,
                index: err.index,
                source: err.source,
            }
        })?;
        let actions = effects.len();

        let receipt = Receipt::new("execute")
            .add_attribute("sender", sender)
            .add_attribute("proposal_id", proposal_id)
            .add_attribute("status", Status::Executed)
            .with_effects(effects)
            .seal(block)?;

        self.environment = environment;
        if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
            proposal.executed = true;
        }

        info!(proposal_id, sender, actions, "proposal executed");
        Ok(receipt)
    }

    /// Close an expired proposal that did not pass.
    pub fn close(
        &mut self,
        block: &BlockInfo,
        sender: &str,
        proposal_id: u64,
    ) -> GovernanceResult<Receipt> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;

        match proposal.current_status(block) {
            Status::Executed => return Err(GovernanceError::CannotCloseExecuted),
            Status::Closed | Status::Passed => return Err(GovernanceError::WrongCloseStatus),
            Status::Open => return Err(GovernanceError::NotExpired),
            Status::Rejected => {}
        }

        let receipt = Receipt::new("close")
            .add_attribute("sender", sender)
            .add_attribute("proposal_id", proposal_id)
            .add_attribute("status", Status::Closed)
            .seal(block)?;

        if let Some(proposal) = self.proposals.get_mut(&proposal_id) {
            proposal.closed = true;
        }

        info!(proposal_id, sender, "proposal closed");
        Ok(receipt)
    }

    pub fn update_metadata(
        &mut self,
        block: &BlockInfo,
        sender: &str,
        metadata: Metadata,
    ) -> GovernanceResult<Receipt> {
        authorize_admin(self.config.executor.as_ref(), &self.registry, sender)?;
        if metadata.name.trim().is_empty() {
            return Err(GovernanceError::EmptyName);
        }

        let receipt = Receipt::new("update_metadata")
            .add_attribute("sender", sender)
            .add_attribute("name", &metadata.name)
            .seal(block)?;

        info!(sender, name = %metadata.name, "metadata updated");
        self.metadata = metadata;
        Ok(receipt)
    }

    /// Change the member set. Open proposals keep the weights they were
    /// created with.
    pub fn update_members(
        &mut self,
        block: &BlockInfo,
        sender: &str,
        add: Vec<Member>,
        remove: Vec<String>,
    ) -> GovernanceResult<Receipt> {
        authorize_admin(self.config.executor.as_ref(), &self.registry, sender)?;

        let (added, removed) = (add.len(), remove.len());
        let mut registry = self.registry.clone();
        let revision = registry.update_members(add, remove)?;
        self.config.threshold.validate(registry.total_weight())?;

        let receipt = Receipt::new("update_members")
            .add_attribute("sender", sender)
            .add_attribute("revision", revision)
            .add_attribute("total_weight", registry.total_weight())
            .seal(block)?;

        info!(
            sender,
            revision,
            added,
            removed,
            total_weight = registry.total_weight(),
            "members updated"
        );
        self.registry = registry;
        Ok(receipt)
    }

    fn expiration_for(
        &self,
        block: &BlockInfo,
        latest: Option<Expiration>,
    ) -> GovernanceResult<Expiration> {
        let max_expires = self.config.max_voting_period.after(block);
        let Some(latest) = latest else {
            return Ok(max_expires);
        };

        match latest.partial_cmp(&max_expires) {
            None => Err(GovernanceError::WrongExpiration),
            Some(Ordering::Greater) => Err(GovernanceError::MaxVotingPeriodExceeded),
            Some(_) if latest.is_expired(block) => Err(GovernanceError::WrongExpiration),
            Some(_) => Ok(latest),
        }
    }
}

/// Read-only queries. None of these touch state.
impl<E> Governance<E> {
    pub fn threshold(&self) -> ThresholdResponse {
        self.config
            .threshold
            .to_response(self.registry.total_weight())
    }

    pub fn proposal(
        &self,
        block: &BlockInfo,
        proposal_id: u64,
    ) -> GovernanceResult<ProposalResponse> {
        self.proposals
            .get(&proposal_id)
            .map(|p| p.to_response(block))
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))
    }

    /// Proposals in ascending id order, strictly after `start_after`.
    pub fn list_proposals(
        &self,
        block: &BlockInfo,
        start_after: Option<u64>,
        limit: Option<u32>,
    ) -> ProposalListResponse {
        let lower = start_after.map_or(Bound::Unbounded, Bound::Excluded);
        let proposals = self
            .proposals
            .range((lower, Bound::Unbounded))
            .take(page_limit(limit))
            .map(|(_, p)| p.to_response(block))
            .collect();
        ProposalListResponse { proposals }
    }

    /// Proposals in descending id order, strictly before `start_before`.
    pub fn reverse_proposals(
        &self,
        block: &BlockInfo,
        start_before: Option<u64>,
        limit: Option<u32>,
    ) -> ProposalListResponse {
        let upper = start_before.map_or(Bound::Unbounded, Bound::Excluded);
        let proposals = self
            .proposals
            .range((Bound::Unbounded, upper))
            .rev()
            .take(page_limit(limit))
            .map(|(_, p)| p.to_response(block))
            .collect();
        ProposalListResponse { proposals }
    }

    /// Ballot `voter` cast on a proposal, if any.
    pub fn ballot(&self, proposal_id: u64, voter: &str) -> VoteResponse {
        let vote = self
            .ballots
            .get(proposal_id, voter)
            .map(|ballot| super::ballots::VoteInfo {
                proposal_id,
                voter: voter.to_string(),
                vote: ballot.vote,
                weight: ballot.weight,
            });
        VoteResponse { vote }
    }

    pub fn list_votes(
        &self,
        proposal_id: u64,
        start_after: Option<&str>,
        limit: Option<u32>,
    ) -> VoteListResponse {
        VoteListResponse {
            votes: self
                .ballots
                .list(proposal_id, start_after, page_limit(limit)),
        }
    }

    pub fn voter(&self, address: &str) -> GovernanceResult<VoterResponse> {
        self.registry
            .weight(address)
            .map(|weight| VoterResponse { weight })
            .ok_or_else(|| GovernanceError::VoterNotFound(address.to_string()))
    }

    pub fn list_voters(&self, start_after: Option<&str>, limit: Option<u32>) -> VoterListResponse {
        voter_list(self.registry.list(start_after, page_limit(limit)))
    }

    pub fn reverse_voters(
        &self,
        start_before: Option<&str>,
        limit: Option<u32>,
    ) -> VoterListResponse {
        voter_list(self.registry.reverse(start_before, page_limit(limit)))
    }

    pub fn group(&self) -> GroupResponse {
        GroupResponse {
            group: self.group.clone(),
            total_weight: self.registry.total_weight(),
            revision: self.registry.revision(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Id the next proposal will get.
    pub fn next_proposal_id(&self) -> u64 {
        self.next_proposal_id
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Direct access to the environment, e.g. to fund the DAO account.
    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.environment
    }
}

fn voter_list(members: Vec<Member>) -> VoterListResponse {
    VoterListResponse {
        voters: members
            .into_iter()
            .map(|m| VoterDetail {
                addr: m.addr,
                weight: m.weight,
            })
            .collect(),
    }
}

impl<E: Serialize + DeserializeOwned> Governance<E> {
    /// Versioned CBOR snapshot of the whole engine.
    pub fn to_bytes(&self) -> GovernanceResult<Vec<u8>> {
        Ok(encode_snapshot(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> GovernanceResult<Self> {
        Ok(decode_snapshot(bytes)?)
    }
}
