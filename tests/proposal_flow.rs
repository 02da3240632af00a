//! Integration test for end-to-end proposal flow.
//!
//! Tests the complete lifecycle against the in-memory chain:
//! 1. Instantiate with a weighted registry
//! 2. Propose a batch of actions
//! 3. Vote, with status derived after every ballot
//! 4. Execute atomically, or let the proposal expire and close it

use dao_gov::actions::{Action, ActionError, Coin, SimulatedChain};
use dao_gov::governance::{
    BlockInfo, Decimal, Duration, ErrorKind, Expiration, Governance, GovernanceError, Member,
    Status, Threshold, Vote,
};
use dao_gov::msg::InstantiateMsg;

const START: u64 = 100;

fn block(height: u64) -> BlockInfo {
    BlockInfo::new(height, 1_700_000_000 + height * 5)
}

/// Registry {A:3, B:2, C:1}, W = 6.
fn governance(threshold: Threshold, funds: u128) -> Governance<SimulatedChain> {
    let mut chain = SimulatedChain::new("dao");
    if funds > 0 {
        chain.fund(funds, "ustars");
    }
    Governance::instantiate(
        InstantiateMsg {
            group_addr: "group".to_string(),
            members: vec![
                Member::new("A", 3),
                Member::new("B", 2),
                Member::new("C", 1),
            ],
            threshold,
            max_voting_period: Duration::Height(20),
            executor: None,
            proposer_votes_yes: false,
            metadata: None,
        },
        chain,
    )
    .unwrap()
}

fn propose(gov: &mut Governance<SimulatedChain>, actions: Vec<Action>) -> u64 {
    gov.propose(
        &block(START),
        "A",
        "Treasury payout".to_string(),
        "Pay contributors".to_string(),
        actions,
        None,
    )
    .unwrap()
    .proposal_id()
    .unwrap()
}

fn send(to: &str, amount: u128) -> Action {
    Action::bank_send(to, vec![Coin::new(amount, "ustars")])
}

#[test]
fn test_majority_percentage_scenario() {
    let mut gov = governance(
        Threshold::AbsolutePercentage {
            percentage: Decimal::percent(50),
        },
        1_000,
    );
    let id = propose(&mut gov, vec![send("designer", 250)]);
    assert_eq!(
        gov.proposal(&block(START), id).unwrap().status,
        Status::Open
    );

    // 3/6 == 0.5 passes on the boundary
    gov.vote(&block(START + 1), "A", id, Vote::Yes).unwrap();
    assert_eq!(
        gov.proposal(&block(START + 1), id).unwrap().status,
        Status::Passed
    );

    // B's No does not take weight away from A's Yes
    gov.vote(&block(START + 2), "B", id, Vote::No).unwrap();
    let proposal = gov.proposal(&block(START + 2), id).unwrap();
    assert_eq!(proposal.status, Status::Passed);
    assert_eq!((proposal.votes.yes, proposal.votes.no), (3, 2));

    let receipt = gov.execute(&block(START + 3), "C", id).unwrap();
    assert_eq!(receipt.attribute("status"), Some("executed"));
    assert_eq!(receipt.effects.len(), 1);
    assert_eq!(
        gov.proposal(&block(START + 3), id).unwrap().status,
        Status::Executed
    );
    assert_eq!(gov.environment().credited("designer", "ustars"), 250);
    assert_eq!(gov.environment().balance("ustars"), 750);
}

#[test]
fn test_quorum_scenario() {
    let mut gov = governance(
        Threshold::ThresholdQuorum {
            threshold: Decimal::percent(60),
            quorum: Decimal::percent(50),
        },
        1_000,
    );
    let id = propose(&mut gov, vec![send("designer", 1)]);

    // 1/6 cast is below quorum even though every cast vote is Yes
    gov.vote(&block(START + 1), "C", id, Vote::Yes).unwrap();
    assert_eq!(
        gov.proposal(&block(START + 1), id).unwrap().status,
        Status::Open
    );

    let expired = block(START + 20);
    assert_eq!(gov.proposal(&expired, id).unwrap().status, Status::Rejected);
    assert!(matches!(
        gov.execute(&expired, "A", id),
        Err(GovernanceError::WrongExecuteState)
    ));
}

#[test]
fn test_quorum_met_decides_at_expiry() {
    let mut gov = governance(
        Threshold::ThresholdQuorum {
            threshold: Decimal::percent(60),
            quorum: Decimal::percent(50),
        },
        1_000,
    );
    let id = propose(&mut gov, vec![send("designer", 1)]);

    // cast 3/6 meets quorum and yes is 2 of 3 opinions (0.67 >= 0.6), but
    // while open A's unused weight could still flip it
    gov.vote(&block(START + 1), "B", id, Vote::Yes).unwrap();
    gov.vote(&block(START + 1), "C", id, Vote::No).unwrap();
    assert_eq!(
        gov.proposal(&block(START + 1), id).unwrap().status,
        Status::Open
    );

    assert_eq!(
        gov.proposal(&block(START + 20), id).unwrap().status,
        Status::Passed
    );
    gov.execute(&block(START + 21), "B", id).unwrap();
}

#[test]
fn test_empty_action_list_consumes_no_id() {
    let mut gov = governance(Threshold::AbsoluteCount { weight: 3 }, 0);

    let err = gov
        .propose(
            &block(START),
            "A",
            "Nothing".to_string(),
            "Does nothing".to_string(),
            vec![],
            None,
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::EmptyActionList));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(gov.next_proposal_id(), 1);
    let listed = gov.list_proposals(&block(START), None, None);
    assert!(listed.proposals.is_empty());

    assert_eq!(propose(&mut gov, vec![send("designer", 1)]), 1);
}

#[test]
fn test_failed_batch_leaves_proposal_executable() {
    let mut gov = governance(Threshold::AbsoluteCount { weight: 3 }, 100);
    let id = propose(
        &mut gov,
        vec![
            send("designer", 60),
            send("auditor", 300),
            send("writer", 10),
        ],
    );
    gov.vote(&block(START + 1), "A", id, Vote::Yes).unwrap();

    let before = gov.clone();
    let err = gov.execute(&block(START + 2), "A", id).unwrap_err();
    match &err {
        GovernanceError::ExecutionFailed { index, source, .. } => {
            assert_eq!(*index, 1);
            assert!(matches!(source, ActionError::InsufficientFunds { .. }));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::ExecutionFailure);

    // nothing from the batch stuck
    assert_eq!(gov, before);
    assert_eq!(
        gov.proposal(&block(START + 2), id).unwrap().status,
        Status::Passed
    );
    assert_eq!(gov.environment().credited("designer", "ustars"), 0);

    // fund the treasury and retry
    gov.environment_mut().fund(400, "ustars");
    gov.execute(&block(START + 3), "A", id).unwrap();
    assert_eq!(gov.environment().credited("designer", "ustars"), 60);
    assert_eq!(gov.environment().credited("auditor", "ustars"), 300);
    assert_eq!(gov.environment().credited("writer", "ustars"), 10);
    assert_eq!(gov.environment().balance("ustars"), 130);
}

#[test]
fn test_malformed_action_is_rejected_at_creation() {
    let mut gov = governance(Threshold::AbsoluteCount { weight: 3 }, 100);
    let err = gov
        .propose(
            &block(START),
            "A",
            "Pay".to_string(),
            "Pay".to_string(),
            vec![send("designer", 1), send("", 1), send("writer", 1)],
            None,
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidAction { index: 1, .. }));
    assert_eq!(gov.next_proposal_id(), 1);
}

#[test]
fn test_expiry_boundary() {
    let mut gov = governance(Threshold::AbsoluteCount { weight: 4 }, 0);
    let id = gov
        .propose(
            &block(START),
            "A",
            "Pay".to_string(),
            "Pay".to_string(),
            vec![send("designer", 1)],
            Some(Expiration::AtHeight(START + 10)),
        )
        .unwrap()
        .proposal_id()
        .unwrap();
    gov.vote(&block(START + 1), "A", id, Vote::Yes).unwrap();

    assert_eq!(
        gov.proposal(&block(START + 9), id).unwrap().status,
        Status::Open
    );
    assert_eq!(
        gov.proposal(&block(START + 10), id).unwrap().status,
        Status::Rejected
    );

    assert!(matches!(
        gov.vote(&block(START + 10), "B", id, Vote::Yes),
        Err(GovernanceError::Expired(_))
    ));
}

#[test]
fn test_close_and_execute_conflicts() {
    let mut gov = governance(Threshold::AbsoluteCount { weight: 3 }, 100);
    let rejected = propose(&mut gov, vec![send("designer", 1)]);
    let passed = propose(&mut gov, vec![send("designer", 1)]);
    gov.vote(&block(START + 1), "A", passed, Vote::Yes).unwrap();

    let expired = block(START + 25);
    gov.close(&expired, "C", rejected).unwrap();
    assert_eq!(
        gov.proposal(&expired, rejected).unwrap().status,
        Status::Closed
    );
    assert!(matches!(
        gov.execute(&expired, "A", rejected),
        Err(GovernanceError::WrongExecuteState)
    ));

    gov.execute(&expired, "A", passed).unwrap();
    let err = gov.close(&expired, "C", passed).unwrap_err();
    assert!(matches!(err, GovernanceError::CannotCloseExecuted));
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert!(matches!(
        gov.execute(&expired, "A", passed),
        Err(GovernanceError::WrongExecuteState)
    ));
    assert!(matches!(
        gov.vote(&block(START + 2), "B", passed, Vote::No),
        Err(GovernanceError::ProposalNotOpen(_))
    ));
}

#[test]
fn test_listing_and_receipts() {
    let mut gov = governance(Threshold::AbsoluteCount { weight: 3 }, 100);
    for _ in 0..3 {
        propose(&mut gov, vec![send("designer", 1)]);
    }
    let a = gov.vote(&block(START + 1), "B", 2, Vote::Yes).unwrap();
    let b = gov.vote(&block(START + 1), "C", 2, Vote::Veto).unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.attribute("sender"), Some("B"));

    let ids: Vec<u64> = gov
        .reverse_proposals(&block(START + 1), None, None)
        .proposals
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let votes = gov.list_votes(2, None, None).votes;
    assert_eq!(votes.len(), 2);
    assert_eq!(votes[0].voter, "B");
    assert_eq!(votes[1].vote, Vote::Veto);
    assert!(gov.ballot(2, "A").vote.is_none());

    assert!(matches!(
        gov.proposal(&block(START), 99),
        Err(GovernanceError::ProposalNotFound(99))
    ));
}
