//! Property-based tests for tallying and threshold evaluation
//!
//! Tests for:
//! - Order independence of AbsoluteCount
//! - Exact percentage boundary
//! - Quorum gating
//! - Re-vote replacement
//! - Query idempotence
//! - Registry totals up to u64::MAX

use super::{
    evaluate, Ballot, BlockInfo, Decimal, Duration, Governance, GovernanceError, Member, Registry,
    Threshold, Verdict, Vote, VoteLedger, Votes,
};
use crate::actions::{Action, Coin, SimulatedChain};
use crate::msg::InstantiateMsg;
use proptest::prelude::*;

fn vote_strategy() -> impl Strategy<Value = Vote> {
    prop_oneof![
        Just(Vote::Yes),
        Just(Vote::No),
        Just(Vote::Abstain),
        Just(Vote::Veto),
    ]
}

/// Mostly small weights, with some large enough that a dozen of them come
/// close to u64::MAX.
fn weight_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![1u64..50, 1u64..=u64::MAX / 16]
}

fn tally_of(ballots: &[(u64, Vote)]) -> Votes {
    let mut votes = Votes::default();
    for (weight, vote) in ballots {
        votes.add_vote(*vote, *weight);
    }
    votes
}

proptest! {
    /// AbsoluteCount passes iff yes-weight reaches the count, whatever the
    /// order ballots arrive in.
    #[test]
    fn prop_absolute_count_order_independent(
        ballots in prop::collection::vec((weight_strategy(), vote_strategy()), 1..12),
        count in prop_oneof![1u64..200, 1u64..=u64::MAX / 2],
    ) {
        let total: u64 = ballots.iter().map(|(w, _)| w).sum();
        let threshold = Threshold::AbsoluteCount { weight: count };

        let forward = tally_of(&ballots);
        let mut reversed = ballots.clone();
        reversed.reverse();
        let backward = tally_of(&reversed);

        prop_assert_eq!(forward, backward);
        let verdict = evaluate(&forward, total, &threshold, false).unwrap();
        prop_assert_eq!(verdict == Verdict::Passed, forward.yes >= count);
    }

    /// yes/total == percentage exactly always passes; one less never does.
    #[test]
    fn prop_percentage_boundary_is_exact(
        percent in 1u64..=100,
        scale in 1u64..1_000,
    ) {
        let total = 100 * scale;
        let boundary = percent * scale;
        let threshold = Threshold::AbsolutePercentage { percentage: Decimal::percent(percent) };

        let at = evaluate(&Votes::yes(boundary), total, &threshold, false).unwrap();
        prop_assert_eq!(at, Verdict::Passed);

        let below = evaluate(&Votes::yes(boundary - 1), total, &threshold, true).unwrap();
        prop_assert_eq!(below, Verdict::Rejected);
    }

    /// The smallest passing yes-weight passes and one less does not, at any
    /// total weight.
    #[test]
    fn prop_percentage_boundary_at_large_totals(
        total in 1u64..=u64::MAX,
        percent in 1u64..=100,
    ) {
        let percentage = Decimal::percent(percent);
        let threshold = Threshold::AbsolutePercentage { percentage };
        let boundary = percentage.ceil_weight(total);
        prop_assert!(boundary <= total);

        let at = evaluate(&Votes::yes(boundary), total, &threshold, false).unwrap();
        prop_assert_eq!(at, Verdict::Passed);
        if boundary > 0 {
            let below = evaluate(&Votes::yes(boundary - 1), total, &threshold, true).unwrap();
            prop_assert_eq!(below, Verdict::Rejected);
        }
    }

    /// The registry total is the exact sum of member weights, or the set is
    /// refused when that sum does not fit in u64.
    #[test]
    fn prop_registry_total_is_exact(
        weights in prop::collection::vec(any::<u64>(), 1..6),
    ) {
        let exact: u128 = weights.iter().map(|w| u128::from(*w)).sum();
        let members = weights
            .iter()
            .enumerate()
            .map(|(i, w)| Member::new(format!("member{}", i), *w))
            .collect();

        match Registry::new(members) {
            Ok(registry) => prop_assert_eq!(u128::from(registry.total_weight()), exact),
            Err(err) => {
                prop_assert!(matches!(err, GovernanceError::WeightOverflow));
                prop_assert!(exact > u128::from(u64::MAX));
            }
        }
    }

    /// Without quorum nothing passes, however lopsided the cast votes are.
    #[test]
    fn prop_quorum_unmet_never_passes(
        total in prop_oneof![10u64..10_000, 10u64..=u64::MAX],
        quorum_pct in 1u64..=100,
        yes in any::<u64>(),
        expired in any::<bool>(),
    ) {
        let needed = Decimal::percent(quorum_pct).ceil_weight(total);
        prop_assume!(needed > 0);
        let yes = yes % needed;
        let threshold = Threshold::ThresholdQuorum {
            threshold: Decimal::percent(1),
            quorum: Decimal::percent(quorum_pct),
        };

        let verdict = evaluate(&Votes::yes(yes), total, &threshold, expired).unwrap();
        prop_assert_ne!(verdict, Verdict::Passed);
    }

    /// A second ballot by the same voter replaces the first.
    #[test]
    fn prop_revote_replaces(
        weight in 1u64..=u64::MAX,
        first in vote_strategy(),
        second in vote_strategy(),
    ) {
        let mut ledger = VoteLedger::new();
        let mut tally = Votes::default();
        ledger.cast(1, "voter", Ballot { weight, vote: first }, &mut tally);
        ledger.cast(1, "voter", Ballot { weight, vote: second }, &mut tally);

        let mut expected = Votes::default();
        expected.add_vote(second, weight);
        prop_assert_eq!(tally, expected);
        prop_assert_eq!(ledger.count(1), 1);
    }

    /// Reading a proposal twice without a write in between gives the same answer.
    #[test]
    fn prop_proposal_query_idempotent(
        votes in prop::collection::vec((0usize..3, vote_strategy()), 0..8),
        height in 1u64..40,
    ) {
        let members = ["alice", "bob", "carol"];
        let msg = InstantiateMsg {
            group_addr: "group".to_string(),
            members: vec![Member::new("alice", 3), Member::new("bob", 2), Member::new("carol", 1)],
            threshold: Threshold::ThresholdQuorum {
                threshold: Decimal::percent(60),
                quorum: Decimal::percent(50),
            },
            max_voting_period: Duration::Height(20),
            executor: None,
            proposer_votes_yes: false,
            metadata: None,
        };
        let mut gov = Governance::instantiate(msg, SimulatedChain::new("dao")).unwrap();
        let start = BlockInfo::new(1, 0);
        let id = gov
            .propose(
                &start,
                "alice",
                "t".to_string(),
                "d".to_string(),
                vec![Action::bank_send("bob", vec![Coin::new(1, "ustars")])],
                None,
            )
            .unwrap()
            .proposal_id()
            .unwrap();
        for (who, vote) in votes {
            gov.vote(&start, members[who], id, vote).unwrap();
        }

        let at = BlockInfo::new(height, 0);
        let first = gov.proposal(&at, id).unwrap();
        let second = gov.proposal(&at, id).unwrap();
        prop_assert_eq!(first, second);
    }
}
