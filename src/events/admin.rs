use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::types::ids::AccountId;
use crate::types::index::Index;
use crate::types::price::Price;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminEvent {
    GlobalOperatorSet {
        operator: AccountId,
        approved: bool,
    },
    LocalOperatorSet {
        account: AccountId,
        operator: AccountId,
        approved: bool,
    },
    MinCollateralSet {
        min_collateral: BigUint,
    },
    /// Price reported by the newly installed oracle.
    OracleSet {
        price: Price,
    },
    FinalSettlementEnabled {
        price: Price,
        index: Index,
    },
}
