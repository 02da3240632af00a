//! Vote ledger.
//!
//! One ballot per (proposal, voter). Casting again replaces the earlier ballot
//! and moves its weight between tally buckets, so a voter is never counted
//! twice.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

/// Ballot choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yes,
    No,
    Abstain,
    Veto,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Vote::Yes => "yes",
            Vote::No => "no",
            Vote::Abstain => "abstain",
            Vote::Veto => "veto",
        };
        f.write_str(s)
    }
}

/// Per-choice sum of ballot weights for one proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
    pub veto: u64,
}

impl Votes {
    /// Tally with a single yes vote of `weight`.
    pub fn yes(weight: u64) -> Self {
        Self {
            yes: weight,
            ..Self::default()
        }
    }

    /// Total weight cast, abstentions included.
    pub fn total(&self) -> u64 {
        self.yes + self.no + self.abstain + self.veto
    }

    pub fn add_vote(&mut self, vote: Vote, weight: u64) {
        *self.bucket(vote) += weight;
    }

    pub fn remove_vote(&mut self, vote: Vote, weight: u64) {
        let bucket = self.bucket(vote);
        *bucket = bucket.saturating_sub(weight);
    }

    pub fn weight_for(&self, vote: Vote) -> u64 {
        match vote {
            Vote::Yes => self.yes,
            Vote::No => self.no,
            Vote::Abstain => self.abstain,
            Vote::Veto => self.veto,
        }
    }

    fn bucket(&mut self, vote: Vote) -> &mut u64 {
        match vote {
            Vote::Yes => &mut self.yes,
            Vote::No => &mut self.no,
            Vote::Abstain => &mut self.abstain,
            Vote::Veto => &mut self.veto,
        }
    }
}

/// A recorded vote. `weight` is the voter's weight in the registry revision
/// the proposal was created against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub weight: u64,
    pub vote: Vote,
}

/// Vote as returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteInfo {
    pub proposal_id: u64,
    pub voter: String,
    pub vote: Vote,
    pub weight: u64,
}

/// All ballots, keyed by (proposal id, voter address).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteLedger {
    ballots: BTreeMap<(u64, String), Ballot>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, proposal_id: u64, voter: &str) -> Option<&Ballot> {
        self.ballots.get(&(proposal_id, voter.to_string()))
    }

    /// Record `ballot`, replacing any previous ballot by `voter`, and keep
    /// `tally` in step. Returns the replaced ballot.
    pub fn cast(
        &mut self,
        proposal_id: u64,
        voter: &str,
        ballot: Ballot,
        tally: &mut Votes,
    ) -> Option<Ballot> {
        let previous = self.ballots.insert((proposal_id, voter.to_string()), ballot);
        retally(previous, ballot, tally);
        previous
    }

    /// Tally `cast` would leave behind, without recording anything.
    pub fn preview(&self, proposal_id: u64, voter: &str, ballot: Ballot, tally: &Votes) -> Votes {
        let mut next = *tally;
        retally(self.get(proposal_id, voter).copied(), ballot, &mut next);
        next
    }

    /// Ballots for a proposal in ascending voter order, strictly after
    /// `start_after`.
    pub fn list(&self, proposal_id: u64, start_after: Option<&str>, limit: usize) -> Vec<VoteInfo> {
        let lower = match start_after {
            Some(voter) => Bound::Excluded((proposal_id, voter.to_string())),
            None => Bound::Included((proposal_id, String::new())),
        };
        let upper = match proposal_id.checked_add(1) {
            Some(next) => Bound::Excluded((next, String::new())),
            None => Bound::Unbounded,
        };

        self.ballots
            .range((lower, upper))
            .take(limit)
            .map(|((id, voter), ballot)| VoteInfo {
                proposal_id: *id,
                voter: voter.clone(),
                vote: ballot.vote,
                weight: ballot.weight,
            })
            .collect()
    }

    /// Number of ballots recorded for a proposal.
    pub fn count(&self, proposal_id: u64) -> usize {
        self.list(proposal_id, None, usize::MAX).len()
    }
}

fn retally(previous: Option<Ballot>, ballot: Ballot, tally: &mut Votes) {
    if let Some(old) = previous {
        tally.remove_vote(old.vote, old.weight);
    }
    tally.add_vote(ballot.vote, ballot.weight);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot(weight: u64, vote: Vote) -> Ballot {
        Ballot { weight, vote }
    }

    #[test]
    fn test_revote_replaces_previous_ballot() {
        let mut ledger = VoteLedger::new();
        let mut tally = Votes::default();

        ledger.cast(1, "alice", ballot(3, Vote::Yes), &mut tally);
        let replaced = ledger.cast(1, "alice", ballot(3, Vote::No), &mut tally);

        assert_eq!(replaced, Some(ballot(3, Vote::Yes)));
        assert_eq!(
            tally,
            Votes {
                yes: 0,
                no: 3,
                abstain: 0,
                veto: 0,
            }
        );
        assert_eq!(ledger.count(1), 1);
    }

    #[test]
    fn test_preview_leaves_ledger_untouched() {
        let mut ledger = VoteLedger::new();
        let mut tally = Votes::default();
        ledger.cast(1, "alice", ballot(2, Vote::Yes), &mut tally);

        let next = ledger.preview(1, "alice", ballot(2, Vote::Abstain), &tally);
        assert_eq!(
            next,
            Votes {
                yes: 0,
                no: 0,
                abstain: 2,
                veto: 0,
            }
        );
        assert_eq!(tally, Votes::yes(2));
        assert_eq!(ledger.get(1, "alice").unwrap().vote, Vote::Yes);
    }

    #[test]
    fn test_ballots_are_scoped_per_proposal() {
        let mut ledger = VoteLedger::new();
        let mut t1 = Votes::default();
        let mut t2 = Votes::default();

        ledger.cast(1, "alice", ballot(1, Vote::Yes), &mut t1);
        ledger.cast(2, "alice", ballot(1, Vote::Veto), &mut t2);

        assert_eq!(ledger.get(1, "alice").unwrap().vote, Vote::Yes);
        assert_eq!(ledger.get(2, "alice").unwrap().vote, Vote::Veto);
        assert!(ledger.get(3, "alice").is_none());
    }

    #[test]
    fn test_list_paginates_by_voter() {
        let mut ledger = VoteLedger::new();
        let mut tally = Votes::default();
        for voter in ["carol", "alice", "bob", "dave"] {
            ledger.cast(7, voter, ballot(1, Vote::Yes), &mut tally);
        }
        ledger.cast(8, "aaron", ballot(1, Vote::No), &mut tally);

        let first: Vec<_> = ledger
            .list(7, None, 2)
            .into_iter()
            .map(|v| v.voter)
            .collect();
        assert_eq!(first, vec!["alice", "bob"]);

        let next: Vec<_> = ledger
            .list(7, Some("bob"), 10)
            .into_iter()
            .map(|v| v.voter)
            .collect();
        assert_eq!(next, vec!["carol", "dave"]);
    }

    #[test]
    fn test_vote_wire_shape() {
        assert_eq!(
            serde_json::to_string(&Vote::Abstain).unwrap(),
            "\"abstain\""
        );
        let vote: Vote = serde_json::from_str("\"veto\"").unwrap();
        assert_eq!(vote, Vote::Veto);
    }
}
