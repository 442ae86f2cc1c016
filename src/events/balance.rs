use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::types::balance::Balance;
use crate::types::ids::AccountId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSettled {
    pub account: AccountId,
    pub is_credit: bool,
    pub amount: BigUint,
    pub balance: Balance,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub account: AccountId,
    pub counterparty: AccountId,  // Depositor or withdrawal destination
    pub update_type: BalanceUpdateType,
    pub amount: BigUint,
    pub balance: Balance,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BalanceUpdateType {
    Deposit,
    Withdrawal,
    FinalSettlement,
}
