//! Membership registry.
//!
//! Weighted voter set backing the DAO. Every change bumps the registry
//! revision and is recorded as a checkpoint, so a proposal can keep reading
//! the weights that were in force when it was created.
//!
//! A member with weight 0 is still a known voter (it may propose) but has no
//! voting power.

use super::error::{GovernanceError, GovernanceResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub addr: String,
    pub weight: u64,
}

impl Member {
    pub fn new(addr: impl Into<String>, weight: u64) -> Self {
        Self {
            addr: addr.into(),
            weight,
        }
    }
}

/// Weighted member set with revision history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    revision: u64,
    /// addr -> (revision, weight) checkpoints; `None` marks removal.
    history: BTreeMap<String, Vec<(u64, Option<u64>)>>,
    /// (revision, total weight) checkpoints.
    totals: Vec<(u64, u64)>,
}

impl Registry {
    /// Build the initial member set (revision 0).
    pub fn new(members: Vec<Member>) -> GovernanceResult<Self> {
        let mut seen = BTreeSet::new();
        for member in &members {
            if member.addr.trim().is_empty() {
                return Err(GovernanceError::EmptyAddress);
            }
            if !seen.insert(member.addr.as_str()) {
                return Err(GovernanceError::DuplicateMember(member.addr.clone()));
            }
        }

        let total = members
            .iter()
            .try_fold(0u64, |total, m| total.checked_add(m.weight))
            .ok_or(GovernanceError::WeightOverflow)?;
        let history = members
            .into_iter()
            .map(|m| (m.addr, vec![(0, Some(m.weight))]))
            .collect();

        Ok(Self {
            revision: 0,
            history,
            totals: vec![(0, total)],
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current weight, `None` if not a member.
    pub fn weight(&self, addr: &str) -> Option<u64> {
        self.weight_at(addr, self.revision)
    }

    /// Weight as of `revision`.
    pub fn weight_at(&self, addr: &str, revision: u64) -> Option<u64> {
        self.history
            .get(addr)?
            .iter()
            .rev()
            .find(|(rev, _)| *rev <= revision)
            .and_then(|(_, weight)| *weight)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight_at(self.revision)
    }

    pub fn total_weight_at(&self, revision: u64) -> u64 {
        self.totals
            .iter()
            .rev()
            .find(|(rev, _)| *rev <= revision)
            .map(|(_, total)| *total)
            .unwrap_or(0)
    }

    /// Number of current members.
    pub fn len(&self) -> usize {
        self.current().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add or reweight `add`, then drop `remove`. Returns the new revision.
    ///
    /// Validation happens before any checkpoint is written.
    pub fn update_members(
        &mut self,
        add: Vec<Member>,
        remove: Vec<String>,
    ) -> GovernanceResult<u64> {
        if add
            .iter()
            .map(|m| m.addr.as_str())
            .chain(remove.iter().map(String::as_str))
            .any(|addr| addr.trim().is_empty())
        {
            return Err(GovernanceError::EmptyAddress);
        }

        let revision = self.revision + 1;
        let mut changes: BTreeMap<String, Option<u64>> = BTreeMap::new();
        for member in add {
            changes.insert(member.addr, Some(member.weight));
        }
        for addr in remove {
            changes.insert(addr, None);
        }

        // removed weight is always part of the current total, so only the
        // final sum can exceed u64
        let mut total = u128::from(self.total_weight());
        let mut checkpoints = Vec::with_capacity(changes.len());
        for (addr, weight) in changes {
            let old = self.weight(&addr);
            if old == weight {
                continue;
            }
            total = total - u128::from(old.unwrap_or(0)) + u128::from(weight.unwrap_or(0));
            checkpoints.push((addr, weight));
        }
        let total = u64::try_from(total).map_err(|_| GovernanceError::WeightOverflow)?;

        for (addr, weight) in checkpoints {
            self.history
                .entry(addr)
                .or_default()
                .push((revision, weight));
        }

        self.revision = revision;
        self.totals.push((revision, total));
        Ok(revision)
    }

    /// Current members in ascending address order, strictly after `start_after`.
    pub fn list(&self, start_after: Option<&str>, limit: usize) -> Vec<Member> {
        let lower = match start_after {
            Some(addr) => Bound::Excluded(addr),
            None => Bound::Unbounded,
        };
        self.history
            .range::<str, _>((lower, Bound::Unbounded))
            .filter_map(|(addr, _)| self.weight(addr).map(|w| Member::new(addr.clone(), w)))
            .take(limit)
            .collect()
    }

    /// Current members in descending address order, strictly before `start_before`.
    pub fn reverse(&self, start_before: Option<&str>, limit: usize) -> Vec<Member> {
        let upper = match start_before {
            Some(addr) => Bound::Excluded(addr),
            None => Bound::Unbounded,
        };
        self.history
            .range::<str, _>((Bound::Unbounded, upper))
            .rev()
            .filter_map(|(addr, _)| self.weight(addr).map(|w| Member::new(addr.clone(), w)))
            .take(limit)
            .collect()
    }

    fn current(&self) -> impl Iterator<Item = &String> + '_ {
        self.history
            .keys()
            .filter(move |addr| self.weight(addr).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::error::ErrorKind;

    fn registry() -> Registry {
        Registry::new(vec![
            Member::new("alice", 3),
            Member::new("bob", 2),
            Member::new("carol", 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_total_weight() {
        assert_eq!(registry().total_weight(), 6);
        assert_eq!(registry().len(), 3);
    }

    #[test]
    fn test_rejects_duplicates_and_blank_addresses() {
        let dup = Registry::new(vec![Member::new("a", 1), Member::new("a", 2)]);
        assert!(matches!(dup, Err(GovernanceError::DuplicateMember(a)) if a == "a"));

        let blank = Registry::new(vec![Member::new(" ", 1)]);
        assert!(matches!(blank, Err(GovernanceError::EmptyAddress)));
    }

    #[test]
    fn test_zero_weight_member_is_known() {
        let reg = Registry::new(vec![Member::new("observer", 0), Member::new("a", 1)]).unwrap();
        assert_eq!(reg.weight("observer"), Some(0));
        assert_eq!(reg.weight("stranger"), None);
    }

    #[test]
    fn test_updates_keep_history() {
        let mut reg = registry();
        let add = vec![Member::new("dave", 4), Member::new("bob", 5)];
        let rev = reg.update_members(add, vec!["carol".to_string()]).unwrap();

        assert_eq!(rev, 1);
        assert_eq!(reg.total_weight(), 3 + 5 + 4);
        assert_eq!(reg.total_weight_at(0), 6);

        assert_eq!(reg.weight("bob"), Some(5));
        assert_eq!(reg.weight_at("bob", 0), Some(2));
        assert_eq!(reg.weight("carol"), None);
        assert_eq!(reg.weight_at("carol", 0), Some(1));
        assert_eq!(reg.weight_at("dave", 0), None);
    }

    #[test]
    fn test_total_weight_overflow_is_rejected() {
        let result = Registry::new(vec![Member::new("a", u64::MAX), Member::new("b", 1)]);
        assert!(matches!(result, Err(GovernanceError::WeightOverflow)));

        let members = vec![Member::new("a", u64::MAX - 1), Member::new("b", 1)];
        let full = Registry::new(members).unwrap();
        assert_eq!(full.total_weight(), u64::MAX);
    }

    #[test]
    fn test_update_overflow_leaves_registry_untouched() {
        let mut reg = Registry::new(vec![Member::new("a", u64::MAX - 1)]).unwrap();
        let before = reg.clone();

        let result = reg.update_members(vec![Member::new("b", 5)], vec![]);
        assert!(matches!(result, Err(GovernanceError::WeightOverflow)));
        assert_eq!(reg, before);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_update_swapping_large_weights() {
        // "a" gains before "z" loses; only the final total has to fit
        let members = vec![Member::new("a", 1), Member::new("z", u64::MAX - 1)];
        let mut reg = Registry::new(members).unwrap();
        let add = vec![Member::new("a", u64::MAX - 1)];
        reg.update_members(add, vec!["z".to_string()]).unwrap();
        assert_eq!(reg.total_weight(), u64::MAX - 1);
        assert_eq!(reg.total_weight_at(0), u64::MAX);
    }

    #[test]
    fn test_update_rejects_blank_address_without_changes() {
        let mut reg = registry();
        let before = reg.clone();
        let result = reg.update_members(vec![Member::new("", 1)], vec![]);
        assert!(matches!(result, Err(GovernanceError::EmptyAddress)));
        assert_eq!(reg, before);
    }

    #[test]
    fn test_list_and_reverse() {
        let mut reg = registry();
        reg.update_members(vec![], vec!["bob".to_string()]).unwrap();

        let forward: Vec<_> = reg.list(None, 10).into_iter().map(|m| m.addr).collect();
        assert_eq!(forward, vec!["alice", "carol"]);

        let after: Vec<_> = reg
            .list(Some("alice"), 10)
            .into_iter()
            .map(|m| m.addr)
            .collect();
        assert_eq!(after, vec!["carol"]);

        let backward: Vec<_> = reg.reverse(None, 1).into_iter().map(|m| m.addr).collect();
        assert_eq!(backward, vec!["carol"]);

        let before: Vec<_> = reg
            .reverse(Some("carol"), 10)
            .into_iter()
            .map(|m| m.addr)
            .collect();
        assert_eq!(before, vec!["alice"]);
    }
}
