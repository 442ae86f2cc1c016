use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::types::ids::{AccountId, OrderHash};
use crate::types::price::Price;
use crate::types::signed::SignedValue;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatusChange {
    Approved,
    Canceled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub hash: OrderHash,
    pub maker: AccountId,
    pub change: OrderStatusChange,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub hash: OrderHash,
    pub amount: BigUint,
    pub price: Price,
    pub fee: SignedValue,
    pub total_filled: BigUint,
}
