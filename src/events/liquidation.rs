use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::types::ids::AccountId;
use crate::types::price::Price;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidated {
    pub maker: AccountId,
    pub taker: AccountId,
    pub amount: BigUint,
    pub is_buy: bool,
    pub price: Price,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleveraged {
    pub maker: AccountId,
    pub taker: AccountId,
    pub amount: BigUint,
    pub is_buy: bool,
    pub price: Price,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleveragingMark {
    pub account: AccountId,
    pub marked: bool,
}
