use im::{HashMap, HashSet};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::Event;
use crate::liquidation::{Deleveraging, Liquidation};
use crate::matching::Orders;
use crate::storage::layout::{encode_account, encode_index};
use crate::types::balance::Balance;
use crate::types::ids::AccountId;
use crate::types::index::Index;
use crate::types::price::Price;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountState {
    pub balance: Balance,
    /// Global index as of the last settlement; `(0, +0)` until first touched.
    pub local_index: Index,
}

/// Price and index frozen when final settlement is enabled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSettlement {
    pub price: Price,
    pub index: Index,
}

/// All mutable engine state. Cloning is cheap: the maps are persistent.
#[derive(Clone, Debug)]
pub struct PerpetualState {
    pub global_index: Index,
    pub min_collateral: BigUint,
    pub vault_balance: BigUint,
    pub accounts: HashMap<AccountId, AccountState>,
    pub global_operators: HashSet<AccountId>,
    pub local_operators: HashSet<(AccountId, AccountId)>,
    pub orders: Orders,
    pub liquidation: Liquidation,
    pub deleveraging: Deleveraging,
    pub final_settlement: Option<FinalSettlement>,
}

impl PerpetualState {
    pub fn new(config: &EngineConfig, now: u64) -> Self {
        PerpetualState {
            global_index: Index::initial(now),
            min_collateral: config.risk.min_collateral.clone(),
            vault_balance: BigUint::default(),
            accounts: HashMap::new(),
            global_operators: HashSet::new(),
            local_operators: HashSet::new(),
            orders: Orders::new(),
            liquidation: Liquidation,
            deleveraging: Deleveraging::new(config.deleveraging.clone()),
            final_settlement: None,
        }
    }

    pub fn account(&self, account: &AccountId) -> AccountState {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    /// Same account, a global operator, or a local operator the account approved.
    pub fn has_account_permissions(&self, account: &AccountId, operator: &AccountId) -> bool {
        account == operator
            || self.global_operators.contains(operator)
            || self.local_operators.contains(&(*account, *operator))
    }
}

/// A working copy of the state for one operation.
///
/// Dropping it discards every change; the engine swaps it in only after
/// `validate_storage` passes.
pub struct Transaction {
    pub state: PerpetualState,
    pub now: u64,
    touched: BTreeSet<AccountId>,
    events: Vec<Event>,
}

impl Transaction {
    pub fn new(state: PerpetualState, now: u64) -> Self {
        Transaction {
            state,
            now,
            touched: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    pub fn account(&self, account: &AccountId) -> AccountState {
        self.state.account(account)
    }

    pub fn set_account(&mut self, account: AccountId, state: AccountState) {
        self.state.accounts.insert(account, state);
        self.touched.insert(account);
    }

    pub fn set_balance(&mut self, account: AccountId, balance: Balance) {
        let mut state = self.account(&account);
        state.balance = balance;
        self.set_account(account, state);
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn touched(&self) -> impl Iterator<Item = &AccountId> {
        self.touched.iter()
    }

    /// Every record this transaction wrote must fit its packed width.
    pub fn validate_storage(&self) -> Result<()> {
        encode_index(&self.state.global_index)?;
        if let Some(final_settlement) = &self.state.final_settlement {
            encode_index(&final_settlement.index)?;
        }
        for account in &self.touched {
            let state = self.state.account(account);
            encode_account(&state.local_index, &state.balance)?;
        }
        Ok(())
    }

    pub fn into_parts(self) -> (PerpetualState, Vec<Event>) {
        (self.state, self.events)
    }
}
