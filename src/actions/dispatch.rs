//! Atomic batch application.
//!
//! A batch is validated up front, then applied in order to a staged copy of
//! the environment. The staged copy replaces the live one only when every
//! action succeeded; on the first failure it is dropped, so nothing from the
//! batch is retained and the caller can retry later.

use super::{Action, ActionError, Coin};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// The world a passed proposal's actions are applied to.
///
/// `Clone` is the staging mechanism: [`apply_batch`] applies the batch to a
/// clone and commits it by replacement.
pub trait ExecutionEnvironment: Clone {
    /// Apply one structurally valid action.
    fn apply(&mut self, action: &Action) -> Result<Effect, ActionError>;
}

/// Effect of one applied action, as reported in the execution receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Transferred { to: String, amount: Vec<Coin> },
    Burned { amount: Vec<Coin> },
    Delegated { validator: String, amount: Coin },
    Undelegated { validator: String, amount: Coin },
    Redelegated {
        src: String,
        dst: String,
        amount: Coin,
    },
    WithdrawAddressSet { address: String },
    RewardsWithdrawn { validator: String },
    ContractExecuted {
        contract_addr: String,
        funds: Vec<Coin>,
    },
    ContractInstantiated { contract_addr: String, code_id: u64 },
    ContractMigrated {
        contract_addr: String,
        new_code_id: u64,
    },
    AdminUpdated {
        contract_addr: String,
        admin: String,
    },
    AdminCleared { contract_addr: String },
    CustomDispatched {
        payload: serde_json::Map<String, serde_json::Value>,
    },
}

/// Failure of one action in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action {index} failed: {source}")]
pub struct BatchError {
    pub index: usize,
    #[source]
    pub source: ActionError,
}

/// Validate every action, then apply them in order, all or nothing.
pub fn apply_batch<E: ExecutionEnvironment>(
    environment: &mut E,
    actions: &[Action],
) -> Result<Vec<Effect>, BatchError> {
    for (index, action) in actions.iter().enumerate() {
        action
            .validate()
            .map_err(|source| BatchError { index, source })?;
    }

    let mut staged = environment.clone();
    let mut effects = Vec::with_capacity(actions.len());

    for (index, action) in actions.iter().enumerate() {
        match staged.apply(action) {
            Ok(effect) => {
                debug!(index, kind = action.kind(), "action applied");
                effects.push(effect);
            }
            Err(source) => {
                warn!(index, kind = action.kind(), error = %source, "batch aborted");
                return Err(BatchError { index, source });
            }
        }
    }

    *environment = staged;
    Ok(effects)
}
