//! Executor gate.
//!
//! Decides who may trigger `execute` on a passed proposal. The policy belongs
//! to the DAO configuration, never to an individual proposal.

use super::error::{GovernanceError, GovernanceResult};
use super::registry::Registry;
use serde::{Deserialize, Serialize};

/// Who may execute passed proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Executor {
    /// Any current member with weight > 0.
    Member,
    /// A single privileged address (timelock, admin).
    Only(String),
}

impl Executor {
    pub fn validate(&self) -> GovernanceResult<()> {
        match self {
            Executor::Only(addr) if addr.trim().is_empty() => Err(GovernanceError::InvalidExecutor),
            _ => Ok(()),
        }
    }
}

/// Check `sender` against the policy. No policy means anyone may execute.
pub fn authorize(
    policy: Option<&Executor>,
    registry: &Registry,
    sender: &str,
) -> GovernanceResult<()> {
    match policy {
        None => Ok(()),
        Some(Executor::Member) => match registry.weight(sender) {
            Some(weight) if weight > 0 => Ok(()),
            _ => Err(GovernanceError::Unauthorized),
        },
        Some(Executor::Only(addr)) if addr == sender => Ok(()),
        Some(Executor::Only(_)) => Err(GovernanceError::Unauthorized),
    }
}

/// Gate for administrative changes (metadata, membership).
///
/// Same as [`authorize`], except that without a policy the caller must still
/// be a weighted member.
pub fn authorize_admin(
    policy: Option<&Executor>,
    registry: &Registry,
    sender: &str,
) -> GovernanceResult<()> {
    authorize(Some(policy.unwrap_or(&Executor::Member)), registry, sender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::registry::Member;

    fn registry() -> Registry {
        Registry::new(vec![Member::new("alice", 3), Member::new("observer", 0)]).unwrap()
    }

    #[test]
    fn test_no_policy_allows_anyone() {
        assert!(authorize(None, &registry(), "stranger").is_ok());
    }

    #[test]
    fn test_member_policy_requires_weight() {
        let reg = registry();
        assert!(authorize(Some(&Executor::Member), &reg, "alice").is_ok());
        assert!(matches!(
            authorize(Some(&Executor::Member), &reg, "observer"),
            Err(GovernanceError::Unauthorized)
        ));
        assert!(matches!(
            authorize(Some(&Executor::Member), &reg, "stranger"),
            Err(GovernanceError::Unauthorized)
        ));
    }

    #[test]
    fn test_only_policy() {
        let reg = registry();
        let policy = Executor::Only("timelock".to_string());
        assert!(authorize(Some(&policy), &reg, "timelock").is_ok());
        assert!(matches!(
            authorize(Some(&policy), &reg, "alice"),
            Err(GovernanceError::Unauthorized)
        ));
    }

    #[test]
    fn test_admin_gate_defaults_to_members() {
        let reg = registry();
        assert!(authorize_admin(None, &reg, "alice").is_ok());
        assert!(authorize_admin(None, &reg, "stranger").is_err());
    }

    #[test]
    fn test_wire_shape() {
        assert_eq!(
            serde_json::to_string(&Executor::Member).unwrap(),
            "\"Member\""
        );
        assert_eq!(
            serde_json::to_string(&Executor::Only("x".to_string())).unwrap(),
            r#"{"Only":"x"}"#
        );
        assert!(Executor::Only(String::new()).validate().is_err());
    }
}
