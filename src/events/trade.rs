use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::interfaces::trader::TraderKind;
use crate::types::balance::Balance;
use crate::types::ids::AccountId;

/// One applied trade argument. `is_buy` is from the taker's side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub maker: AccountId,
    pub taker: AccountId,
    pub trader: TraderKind,
    pub margin_amount: BigUint,
    pub position_amount: BigUint,
    pub is_buy: bool,
    pub maker_balance: Balance,
    pub taker_balance: Balance,
}
