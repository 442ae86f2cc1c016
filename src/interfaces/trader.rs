use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::types::balance::Balance;
use crate::types::ids::AccountId;
use crate::types::price::Price;

pub const TRADER_FLAG_ORDERS: u32 = 1;
pub const TRADER_FLAG_LIQUIDATION: u32 = 1 << 1;
pub const TRADER_FLAG_DELEVERAGING: u32 = 1 << 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraderKind {
    Orders,
    Liquidation,
    Deleveraging,
}

impl TraderKind {
    pub fn label(&self) -> &'static str {
        match self {
            TraderKind::Orders => "orders",
            TraderKind::Liquidation => "liquidation",
            TraderKind::Deleveraging => "deleveraging",
        }
    }
}

/// Everything a trader may inspect when pricing one maker/taker exchange.
///
/// Balances are the settled, in-transaction balances as of this trade
/// argument (earlier arguments of the same call are already applied).
#[derive(Debug)]
pub struct TradeRequest<'a> {
    pub sender: AccountId,
    pub maker: AccountId,
    pub taker: AccountId,
    pub price: &'a Price,
    pub min_collateral: &'a BigUint,
    pub now: u64,
    pub maker_balance: &'a Balance,
    pub taker_balance: &'a Balance,
    /// Union of the flags returned by earlier traders in this call.
    pub trader_flags: u32,
    pub sender_can_act_for_taker: bool,
}

/// Balance movement decided by a trader. `is_buy` is from the taker's side:
/// the taker pays `margin_amount` and gains `position_amount`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeResult {
    pub margin_amount: BigUint,
    pub position_amount: BigUint,
    pub is_buy: bool,
    pub trader_flags: u32,
}

pub trait Trader {
    type Args;

    fn trade(&mut self, request: &TradeRequest<'_>, args: &Self::Args) -> Result<TradeResult>;
}
