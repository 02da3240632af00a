//! Proposal actions.
//!
//! A proposal carries an ordered batch of chain messages. The engine only
//! checks their shape; what a staking delegate or a contract call actually does
//! is up to the [`ExecutionEnvironment`] the batch is applied to.
//!
//! Every message struct keeps unrecognised fields in `extra`, so a batch
//! decoded from a client and re-encoded for display to voters is unchanged.

pub mod dispatch;
pub mod simulated;

pub use dispatch::{apply_batch, BatchError, Effect, ExecutionEnvironment};
pub use simulated::SimulatedChain;

use crate::governance::decimal::Uint128;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Fields carried through without interpretation.
pub type Extra = BTreeMap<String, Value>;

/// Action failures: structural problems and environment refusals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{field} cannot be empty")]
    EmptyAddress { field: &'static str },

    #[error("coin denom cannot be empty")]
    EmptyDenom,

    #[error("amount of {denom} must be greater than zero")]
    ZeroAmount { denom: String },

    #[error("at least one coin is required")]
    NoCoins,

    #[error("source and destination validator are the same")]
    SameValidator,

    #[error("code id cannot be zero")]
    ZeroCodeId,

    #[error("contract label cannot be empty")]
    EmptyLabel,

    #[error("message payload is not valid base64")]
    InvalidBinary,

    #[error("insufficient {denom}: need {needed}, have {available}")]
    InsufficientFunds {
        denom: String,
        needed: u128,
        available: u128,
    },

    #[error("no {denom} delegated to {validator}")]
    NoDelegation { validator: String, denom: String },

    #[error("unknown contract {0}")]
    UnknownContract(String),

    #[error("not the admin of contract {0}")]
    NotContractAdmin(String),

    #[error("action rejected: {0}")]
    Rejected(String),
}

/// Base64-encoded opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binary(pub String);

impl Binary {
    fn validate(&self) -> Result<(), ActionError> {
        let bytes = self.0.as_bytes();
        let well_formed = !bytes.is_empty()
            && bytes.len() % 4 == 0
            && bytes
                .iter()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='));
        let padding_at_end = self
            .0
            .find('=')
            .map(|pos| self.0[pos..].bytes().all(|b| b == b'=') && self.0.len() - pos <= 2)
            .unwrap_or(true);

        if well_formed && padding_at_end {
            Ok(())
        } else {
            Err(ActionError::InvalidBinary)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Uint128,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: Uint128::new(amount),
            extra: Extra::new(),
        }
    }

    fn validate(&self) -> Result<(), ActionError> {
        if self.denom.trim().is_empty() {
            return Err(ActionError::EmptyDenom);
        }
        if self.amount.is_zero() {
            return Err(ActionError::ZeroAmount {
                denom: self.denom.clone(),
            });
        }
        Ok(())
    }
}

/// A single proposal action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Bank(BankMsg),
    /// Chain-specific payload, passed through untouched.
    Custom(serde_json::Map<String, Value>),
    Staking(StakingMsg),
    Distribution(DistributionMsg),
    Wasm(WasmMsg),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankMsg {
    Send(BankSend),
    Burn(BankBurn),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSend {
    pub to_address: String,
    pub amount: Vec<Coin>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankBurn {
    pub amount: Vec<Coin>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakingMsg {
    Delegate(Delegate),
    Undelegate(Undelegate),
    Redelegate(Redelegate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegate {
    pub validator: String,
    pub amount: Coin,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Undelegate {
    pub validator: String,
    pub amount: Coin,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redelegate {
    pub src_validator: String,
    pub dst_validator: String,
    pub amount: Coin,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMsg {
    SetWithdrawAddress(SetWithdrawAddress),
    WithdrawDelegatorReward(WithdrawDelegatorReward),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetWithdrawAddress {
    pub address: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawDelegatorReward {
    pub validator: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasmMsg {
    Execute(WasmExecute),
    Instantiate(WasmInstantiate),
    Migrate(WasmMigrate),
    UpdateAdmin(UpdateAdmin),
    ClearAdmin(ClearAdmin),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasmExecute {
    pub contract_addr: String,
    pub msg: Binary,
    #[serde(default)]
    pub funds: Vec<Coin>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasmInstantiate {
    #[serde(default)]
    pub admin: Option<String>,
    pub code_id: u64,
    pub msg: Binary,
    #[serde(default)]
    pub funds: Vec<Coin>,
    pub label: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasmMigrate {
    pub contract_addr: String,
    pub new_code_id: u64,
    pub msg: Binary,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAdmin {
    pub contract_addr: String,
    pub admin: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearAdmin {
    pub contract_addr: String,
    #[serde(flatten)]
    pub extra: Extra,
}

fn non_empty(value: &str, field: &'static str) -> Result<(), ActionError> {
    if value.trim().is_empty() {
        Err(ActionError::EmptyAddress { field })
    } else {
        Ok(())
    }
}

fn coins(amount: &[Coin]) -> Result<(), ActionError> {
    if amount.is_empty() {
        return Err(ActionError::NoCoins);
    }
    amount.iter().try_for_each(Coin::validate)
}

impl Action {
    /// Structural check: non-empty addresses, positive amounts, sane ids.
    pub fn validate(&self) -> Result<(), ActionError> {
        match self {
            Action::Bank(BankMsg::Send(send)) => {
                non_empty(&send.to_address, "to_address")?;
                coins(&send.amount)
            }
            Action::Bank(BankMsg::Burn(burn)) => coins(&burn.amount),
            Action::Custom(_) => Ok(()),
            Action::Staking(StakingMsg::Delegate(d)) => {
                non_empty(&d.validator, "validator")?;
                d.amount.validate()
            }
            Action::Staking(StakingMsg::Undelegate(u)) => {
                non_empty(&u.validator, "validator")?;
                u.amount.validate()
            }
            Action::Staking(StakingMsg::Redelegate(r)) => {
                non_empty(&r.src_validator, "src_validator")?;
                non_empty(&r.dst_validator, "dst_validator")?;
                if r.src_validator == r.dst_validator {
                    return Err(ActionError::SameValidator);
                }
                r.amount.validate()
            }
            Action::Distribution(DistributionMsg::SetWithdrawAddress(s)) => {
                non_empty(&s.address, "address")
            }
            Action::Distribution(DistributionMsg::WithdrawDelegatorReward(w)) => {
                non_empty(&w.validator, "validator")
            }
            Action::Wasm(WasmMsg::Execute(e)) => {
                non_empty(&e.contract_addr, "contract_addr")?;
                e.msg.validate()?;
                e.funds.iter().try_for_each(Coin::validate)
            }
            Action::Wasm(WasmMsg::Instantiate(i)) => {
                if let Some(admin) = &i.admin {
                    non_empty(admin, "admin")?;
                }
                if i.code_id == 0 {
                    return Err(ActionError::ZeroCodeId);
                }
                if i.label.trim().is_empty() {
                    return Err(ActionError::EmptyLabel);
                }
                i.msg.validate()?;
                i.funds.iter().try_for_each(Coin::validate)
            }
            Action::Wasm(WasmMsg::Migrate(m)) => {
                non_empty(&m.contract_addr, "contract_addr")?;
                if m.new_code_id == 0 {
                    return Err(ActionError::ZeroCodeId);
                }
                m.msg.validate()
            }
            Action::Wasm(WasmMsg::UpdateAdmin(u)) => {
                non_empty(&u.contract_addr, "contract_addr")?;
                non_empty(&u.admin, "admin")
            }
            Action::Wasm(WasmMsg::ClearAdmin(c)) => non_empty(&c.contract_addr, "contract_addr"),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Bank(BankMsg::Send(_)) => "bank/send",
            Action::Bank(BankMsg::Burn(_)) => "bank/burn",
            Action::Custom(_) => "custom",
            Action::Staking(StakingMsg::Delegate(_)) => "staking/delegate",
            Action::Staking(StakingMsg::Undelegate(_)) => "staking/undelegate",
            Action::Staking(StakingMsg::Redelegate(_)) => "staking/redelegate",
            Action::Distribution(DistributionMsg::SetWithdrawAddress(_)) => {
                "distribution/set_withdraw_address"
            }
            Action::Distribution(DistributionMsg::WithdrawDelegatorReward(_)) => {
                "distribution/withdraw_delegator_reward"
            }
            Action::Wasm(WasmMsg::Execute(_)) => "wasm/execute",
            Action::Wasm(WasmMsg::Instantiate(_)) => "wasm/instantiate",
            Action::Wasm(WasmMsg::Migrate(_)) => "wasm/migrate",
            Action::Wasm(WasmMsg::UpdateAdmin(_)) => "wasm/update_admin",
            Action::Wasm(WasmMsg::ClearAdmin(_)) => "wasm/clear_admin",
        }
    }

    pub fn bank_send(to_address: impl Into<String>, amount: Vec<Coin>) -> Self {
        Action::Bank(BankMsg::Send(BankSend {
            to_address: to_address.into(),
            amount,
            extra: Extra::new(),
        }))
    }

    pub fn bank_burn(amount: Vec<Coin>) -> Self {
        Action::Bank(BankMsg::Burn(BankBurn {
            amount,
            extra: Extra::new(),
        }))
    }

    pub fn delegate(validator: impl Into<String>, amount: Coin) -> Self {
        Action::Staking(StakingMsg::Delegate(Delegate {
            validator: validator.into(),
            amount,
            extra: Extra::new(),
        }))
    }
}
