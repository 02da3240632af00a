//! Message dispatch.
//!
//! Routes decoded `ExecuteMsg`/`QueryMsg` values to the engine. Queries answer
//! with JSON-encoded response bytes, as a smart query would.

use crate::actions::ExecutionEnvironment;
use crate::governance::{BlockInfo, Governance, GovernanceError, GovernanceResult, Receipt};
use crate::msg::{ExecuteMsg, Metadata, QueryMsg};
use crate::serialization::{from_json, to_json};
use tracing::debug;

pub fn execute<E: ExecutionEnvironment>(
    gov: &mut Governance<E>,
    block: &BlockInfo,
    sender: &str,
    msg: ExecuteMsg,
) -> GovernanceResult<Receipt> {
    match msg {
        ExecuteMsg::Propose {
            title,
            description,
            msgs,
            latest,
        } => gov.propose(block, sender, title, description, msgs, latest),
        ExecuteMsg::Vote { proposal_id, vote } => gov.vote(block, sender, proposal_id, vote),
        ExecuteMsg::Execute { proposal_id } => gov.execute(block, sender, proposal_id),
        ExecuteMsg::Close { proposal_id } => gov.close(block, sender, proposal_id),
        ExecuteMsg::UpdateMetadata {
            name,
            description,
            image,
        } => gov.update_metadata(
            block,
            sender,
            Metadata {
                name,
                description,
                image,
            },
        ),
        ExecuteMsg::UpdateMembers { add, remove } => gov.update_members(block, sender, add, remove),
    }
}

pub fn query<E>(
    gov: &Governance<E>,
    block: &BlockInfo,
    msg: QueryMsg,
) -> GovernanceResult<Vec<u8>> {
    let bytes = match msg {
        QueryMsg::Threshold {} => to_json(&gov.threshold())?,
        QueryMsg::Proposal { proposal_id } => to_json(&gov.proposal(block, proposal_id)?)?,
        QueryMsg::ListProposals { start_after, limit } => {
            to_json(&gov.list_proposals(block, start_after, limit))?
        }
        QueryMsg::ReverseProposals {
            start_before,
            limit,
        } => to_json(&gov.reverse_proposals(block, start_before, limit))?,
        QueryMsg::Vote { proposal_id, voter } => to_json(&gov.ballot(proposal_id, &voter))?,
        QueryMsg::ListVotes {
            proposal_id,
            start_after,
            limit,
        } => to_json(&gov.list_votes(proposal_id, start_after.as_deref(), limit))?,
        QueryMsg::Voter { address } => to_json(&gov.voter(&address)?)?,
        QueryMsg::ListVoters { start_after, limit } => {
            to_json(&gov.list_voters(start_after.as_deref(), limit))?
        }
        QueryMsg::ReverseVoters {
            start_before,
            limit,
        } => to_json(&gov.reverse_voters(start_before.as_deref(), limit))?,
        QueryMsg::Group {} => to_json(&gov.group())?,
        QueryMsg::Metadata {} => to_json(gov.metadata())?,
    };
    Ok(bytes)
}

/// Decode a JSON `ExecuteMsg` and run it.
pub fn execute_json<E: ExecutionEnvironment>(
    gov: &mut Governance<E>,
    block: &BlockInfo,
    sender: &str,
    msg: &[u8],
) -> GovernanceResult<Receipt> {
    let msg: ExecuteMsg = from_json(msg).map_err(GovernanceError::InvalidMessage)?;
    debug!(sender, height = block.height, "execute message decoded");
    execute(gov, block, sender, msg)
}

/// Decode a JSON `QueryMsg` and answer it.
pub fn query_json<E>(
    gov: &Governance<E>,
    block: &BlockInfo,
    msg: &[u8],
) -> GovernanceResult<Vec<u8>> {
    let msg: QueryMsg = from_json(msg).map_err(GovernanceError::InvalidMessage)?;
    query(gov, block, msg)
}
