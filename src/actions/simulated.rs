//! In-memory execution environment.
//!
//! Models the DAO contract's own account: its bank balances, delegations,
//! withdraw address and the contracts it administers. Used by the local chain
//! and by tests; production deployments plug in their own
//! [`ExecutionEnvironment`].

use super::dispatch::{Effect, ExecutionEnvironment};
use super::{
    Action, ActionError, BankMsg, Coin, DistributionMsg, StakingMsg, WasmMsg,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contract known to the simulated chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub code_id: u64,
    pub admin: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedChain {
    /// Address of the DAO contract (the account actions are sent from).
    address: String,
    /// denom -> amount held by the DAO.
    balances: BTreeMap<String, u128>,
    /// (address, denom) -> amount received from the DAO.
    credited: BTreeMap<(String, String), u128>,
    /// (validator, denom) -> bonded amount.
    delegations: BTreeMap<(String, String), u128>,
    /// denom -> amount unbonding.
    unbonding: BTreeMap<String, u128>,
    withdraw_address: Option<String>,
    contracts: BTreeMap<String, ContractInfo>,
    instantiated: u64,
    custom: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl SimulatedChain {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            balances: BTreeMap::new(),
            credited: BTreeMap::new(),
            delegations: BTreeMap::new(),
            unbonding: BTreeMap::new(),
            withdraw_address: None,
            contracts: BTreeMap::new(),
            instantiated: 0,
            custom: Vec::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Deposit funds into the DAO account.
    pub fn fund(&mut self, amount: u128, denom: &str) {
        *self.balances.entry(denom.to_string()).or_default() += amount;
    }

    pub fn balance(&self, denom: &str) -> u128 {
        self.balances.get(denom).copied().unwrap_or(0)
    }

    /// Amount `addr` has received from the DAO.
    pub fn credited(&self, addr: &str, denom: &str) -> u128 {
        self.credited
            .get(&(addr.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn delegation(&self, validator: &str, denom: &str) -> u128 {
        self.delegations
            .get(&(validator.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn unbonding(&self, denom: &str) -> u128 {
        self.unbonding.get(denom).copied().unwrap_or(0)
    }

    pub fn withdraw_address(&self) -> Option<&str> {
        self.withdraw_address.as_deref()
    }

    pub fn contract(&self, addr: &str) -> Option<&ContractInfo> {
        self.contracts.get(addr)
    }

    pub fn custom_messages(&self) -> &[serde_json::Map<String, serde_json::Value>] {
        &self.custom
    }

    /// Make an existing contract known (test setup).
    pub fn register_contract(&mut self, addr: &str, code_id: u64, admin: Option<&str>) {
        self.contracts.insert(
            addr.to_string(),
            ContractInfo {
                code_id,
                admin: admin.map(str::to_string),
                label: addr.to_string(),
            },
        );
    }

    fn debit(&mut self, coin: &Coin) -> Result<(), ActionError> {
        let available = self.balance(&coin.denom);
        let needed = coin.amount.u128();
        if available < needed {
            return Err(ActionError::InsufficientFunds {
                denom: coin.denom.clone(),
                needed,
                available,
            });
        }
        self.balances.insert(coin.denom.clone(), available - needed);
        Ok(())
    }

    fn debit_all(&mut self, coins: &[Coin]) -> Result<(), ActionError> {
        coins.iter().try_for_each(|coin| self.debit(coin))
    }

    fn credit(&mut self, addr: &str, coins: &[Coin]) {
        for coin in coins {
            *self
                .credited
                .entry((addr.to_string(), coin.denom.clone()))
                .or_default() += coin.amount.u128();
        }
    }

    fn unbond(&mut self, validator: &str, coin: &Coin) -> Result<(), ActionError> {
        let key = (validator.to_string(), coin.denom.clone());
        let bonded = self.delegations.get(&key).copied().unwrap_or(0);
        if bonded == 0 {
            return Err(ActionError::NoDelegation {
                validator: validator.to_string(),
                denom: coin.denom.clone(),
            });
        }
        if bonded < coin.amount.u128() {
            return Err(ActionError::InsufficientFunds {
                denom: coin.denom.clone(),
                needed: coin.amount.u128(),
                available: bonded,
            });
        }
        self.delegations.insert(key, bonded - coin.amount.u128());
        Ok(())
    }

    fn bond(&mut self, validator: &str, coin: &Coin) {
        *self
            .delegations
            .entry((validator.to_string(), coin.denom.clone()))
            .or_default() += coin.amount.u128();
    }

    fn administered(&self, contract_addr: &str) -> Result<&ContractInfo, ActionError> {
        let info = self
            .contracts
            .get(contract_addr)
            .ok_or_else(|| ActionError::UnknownContract(contract_addr.to_string()))?;
        if info.admin.as_deref() != Some(self.address.as_str()) {
            return Err(ActionError::NotContractAdmin(contract_addr.to_string()));
        }
        Ok(info)
    }
}

impl ExecutionEnvironment for SimulatedChain {
    fn apply(&mut self, action: &Action) -> Result<Effect, ActionError> {
        match action {
            Action::Bank(BankMsg::Send(send)) => {
                self.debit_all(&send.amount)?;
                self.credit(&send.to_address, &send.amount);
                Ok(Effect::Transferred {
                    to: send.to_address.clone(),
                    amount: send.amount.clone(),
                })
            }
            Action::Bank(BankMsg::Burn(burn)) => {
                self.debit_all(&burn.amount)?;
                Ok(Effect::Burned {
                    amount: burn.amount.clone(),
                })
            }
            Action::Custom(payload) => {
                self.custom.push(payload.clone());
                Ok(Effect::CustomDispatched {
                    payload: payload.clone(),
                })
            }
            Action::Staking(StakingMsg::Delegate(d)) => {
                self.debit(&d.amount)?;
                self.bond(&d.validator, &d.amount);
                Ok(Effect::Delegated {
                    validator: d.validator.clone(),
                    amount: d.amount.clone(),
                })
            }
            Action::Staking(StakingMsg::Undelegate(u)) => {
                self.unbond(&u.validator, &u.amount)?;
                let unbonding = self.unbonding.entry(u.amount.denom.clone()).or_default();
                *unbonding += u.amount.amount.u128();
                Ok(Effect::Undelegated {
                    validator: u.validator.clone(),
                    amount: u.amount.clone(),
                })
            }
            Action::Staking(StakingMsg::Redelegate(r)) => {
                self.unbond(&r.src_validator, &r.amount)?;
                self.bond(&r.dst_validator, &r.amount);
                Ok(Effect::Redelegated {
                    src: r.src_validator.clone(),
                    dst: r.dst_validator.clone(),
                    amount: r.amount.clone(),
                })
            }
            Action::Distribution(DistributionMsg::SetWithdrawAddress(s)) => {
                self.withdraw_address = Some(s.address.clone());
                Ok(Effect::WithdrawAddressSet {
                    address: s.address.clone(),
                })
            }
            Action::Distribution(DistributionMsg::WithdrawDelegatorReward(w)) => {
                let bonded = self
                    .delegations
                    .iter()
                    .any(|((validator, _), amount)| validator == &w.validator && *amount > 0);
                if !bonded {
                    return Err(ActionError::NoDelegation {
                        validator: w.validator.clone(),
                        denom: "*".to_string(),
                    });
                }
                Ok(Effect::RewardsWithdrawn {
                    validator: w.validator.clone(),
                })
            }
            Action::Wasm(WasmMsg::Execute(e)) => {
                if !self.contracts.contains_key(&e.contract_addr) {
                    return Err(ActionError::UnknownContract(e.contract_addr.clone()));
                }
                self.debit_all(&e.funds)?;
                self.credit(&e.contract_addr, &e.funds);
                Ok(Effect::ContractExecuted {
                    contract_addr: e.contract_addr.clone(),
                    funds: e.funds.clone(),
                })
            }
            Action::Wasm(WasmMsg::Instantiate(i)) => {
                self.debit_all(&i.funds)?;
                self.instantiated += 1;
                let contract_addr = format!("contract{}", self.instantiated);
                self.credit(&contract_addr, &i.funds);
                self.contracts.insert(
                    contract_addr.clone(),
                    ContractInfo {
                        code_id: i.code_id,
                        admin: i.admin.clone(),
                        label: i.label.clone(),
                    },
                );
                Ok(Effect::ContractInstantiated {
                    contract_addr,
                    code_id: i.code_id,
                })
            }
            Action::Wasm(WasmMsg::Migrate(m)) => {
                self.administered(&m.contract_addr)?;
                if let Some(info) = self.contracts.get_mut(&m.contract_addr) {
                    info.code_id = m.new_code_id;
                }
                Ok(Effect::ContractMigrated {
                    contract_addr: m.contract_addr.clone(),
                    new_code_id: m.new_code_id,
                })
            }
            Action::Wasm(WasmMsg::UpdateAdmin(u)) => {
                self.administered(&u.contract_addr)?;
                if let Some(info) = self.contracts.get_mut(&u.contract_addr) {
                    info.admin = Some(u.admin.clone());
                }
                Ok(Effect::AdminUpdated {
                    contract_addr: u.contract_addr.clone(),
                    admin: u.admin.clone(),
                })
            }
            Action::Wasm(WasmMsg::ClearAdmin(c)) => {
                self.administered(&c.contract_addr)?;
                if let Some(info) = self.contracts.get_mut(&c.contract_addr) {
                    info.admin = None;
                }
                Ok(Effect::AdminCleared {
                    contract_addr: c.contract_addr.clone(),
                })
            }
        }
    }
}
