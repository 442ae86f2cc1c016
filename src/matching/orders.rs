use im::HashMap;
use num_bigint::BigUint;
use num_traits::CheckedSub;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::error::{Error, Result};
use crate::interfaces::trader::{TradeRequest, TradeResult, Trader, TRADER_FLAG_ORDERS};
use crate::types::fixed::base_mul;
use crate::types::ids::{AccountId, OrderHash};
use crate::types::price::Price;
use crate::types::signed::SignedValue;

const FLAG_IS_BUY: u8 = 1;
const FLAG_DECREASE_ONLY: u8 = 1 << 1;

/// A maker's standing instruction, approved on-engine instead of signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub maker: AccountId,
    /// Any taker when unset.
    pub taker: Option<AccountId>,
    /// From the maker's side.
    pub is_buy: bool,
    pub is_decrease_only: bool,
    pub amount: BigUint,
    pub limit_price: Price,
    /// Zero means no trigger.
    pub trigger_price: Price,
    /// Fee rate ceiling; negative means the maker demands at least this rebate.
    pub limit_fee: SignedValue,
    /// Unix seconds; zero never expires.
    pub expiration: u64,
    pub salt: u64,
}

impl Order {
    /// SHA-256 over a length-prefixed big-endian encoding of every field.
    pub fn hash(&self) -> OrderHash {
        let mut flags = 0u8;
        if self.is_buy {
            flags |= FLAG_IS_BUY;
        }
        if self.is_decrease_only {
            flags |= FLAG_DECREASE_ONLY;
        }

        let mut hasher = Sha256::new();
        hasher.update([flags]);
        hasher.update(self.maker.0.as_bytes());
        hasher.update(self.taker.unwrap_or_default().0.as_bytes());
        for value in [&self.amount, self.limit_price.raw_value(), self.trigger_price.raw_value()] {
            update_magnitude(&mut hasher, value);
        }
        hasher.update([u8::from(self.limit_fee.is_positive())]);
        update_magnitude(&mut hasher, self.limit_fee.magnitude());
        hasher.update(self.expiration.to_be_bytes());
        hasher.update(self.salt.to_be_bytes());
        OrderHash(hasher.finalize().into())
    }
}

fn update_magnitude(hasher: &mut Sha256, value: &BigUint) {
    let bytes = value.to_bytes_be();
    hasher.update((bytes.len() as u32).to_be_bytes());
    hasher.update(&bytes);
}

/// Execution terms chosen by the taker for one fill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub amount: BigUint,
    pub price: Price,
    /// Fee rate charged to the maker; negative is a rebate.
    pub fee: SignedValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderArgs {
    pub order: Order,
    pub fill: Fill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Open,
    Approved,
    Canceled,
}

/// Order status and fill bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct Orders {
    statuses: HashMap<OrderHash, OrderStatus>,
    filled: HashMap<OrderHash, BigUint>,
}

impl Orders {
    pub fn new() -> Self {
        Orders::default()
    }

    pub fn from_parts(
        statuses: impl IntoIterator<Item = (OrderHash, OrderStatus)>,
        filled: impl IntoIterator<Item = (OrderHash, BigUint)>,
    ) -> Self {
        Orders {
            statuses: statuses.into_iter().collect(),
            filled: filled.into_iter().collect(),
        }
    }

    pub fn status(&self, hash: &OrderHash) -> OrderStatus {
        self.statuses.get(hash).copied().unwrap_or_default()
    }

    pub fn filled_amount(&self, hash: &OrderHash) -> BigUint {
        self.filled.get(hash).cloned().unwrap_or_default()
    }

    pub fn statuses(&self) -> impl Iterator<Item = (&OrderHash, &OrderStatus)> {
        self.statuses.iter()
    }

    pub fn filled_amounts(&self) -> impl Iterator<Item = (&OrderHash, &BigUint)> {
        self.filled.iter()
    }

    pub fn approve(&mut self, sender: AccountId, order: &Order) -> Result<OrderHash> {
        let hash = order.hash();
        if sender != order.maker {
            return Err(Error::OrderRejected { hash, reason: "order cannot be approved by non-maker" });
        }
        if self.status(&hash) == OrderStatus::Canceled {
            return Err(Error::OrderRejected { hash, reason: "canceled order cannot be approved" });
        }
        self.statuses.insert(hash, OrderStatus::Approved);
        Ok(hash)
    }

    /// Canceling is permanent, including for orders never approved.
    pub fn cancel(&mut self, sender: AccountId, order: &Order) -> Result<OrderHash> {
        let hash = order.hash();
        if sender != order.maker {
            return Err(Error::OrderRejected { hash, reason: "order cannot be canceled by non-maker" });
        }
        self.statuses.insert(hash, OrderStatus::Canceled);
        Ok(hash)
    }

    fn verify_request(&self, hash: OrderHash, request: &TradeRequest<'_>, args: &OrderArgs) -> Result<()> {
        let reject = |reason| Err(Error::OrderRejected { hash, reason });
        let order = &args.order;
        let fill = &args.fill;

        match self.status(&hash) {
            OrderStatus::Canceled => return reject("order was already canceled"),
            OrderStatus::Open => return reject("order was not approved"),
            OrderStatus::Approved => {}
        }

        if order.maker != request.maker {
            return reject("order maker does not match maker");
        }
        if order.taker.is_some_and(|taker| taker != request.taker) {
            return reject("order taker does not match taker");
        }
        if order.expiration != 0 && order.expiration < request.now {
            return reject("order has expired");
        }

        let valid_price = if order.is_buy {
            fill.price <= order.limit_price
        } else {
            fill.price >= order.limit_price
        };
        if !valid_price {
            return reject("fill price is invalid");
        }
        if fill.fee > order.limit_fee {
            return reject("fill fee is invalid");
        }

        if !order.trigger_price.is_zero() {
            let triggered = if order.is_buy {
                &order.trigger_price <= request.price
            } else {
                &order.trigger_price >= request.price
            };
            if !triggered {
                return reject("trigger price has not been reached");
            }
        }

        if order.is_decrease_only {
            let position = &request.maker_balance.position;
            if order.is_buy == position.is_positive() || &fill.amount > position.magnitude() {
                return reject("fill does not decrease position");
            }
        }

        Ok(())
    }
}

impl Trader for Orders {
    type Args = OrderArgs;

    fn trade(&mut self, request: &TradeRequest<'_>, args: &OrderArgs) -> Result<TradeResult> {
        if !request.sender_can_act_for_taker {
            return Err(Error::MissingAccountPermissions {
                sender: request.sender,
                account: request.taker,
            });
        }

        let hash = args.order.hash();
        self.verify_request(hash, request, args)?;

        let fill = &args.fill;
        let total_filled = self.filled_amount(&hash) + &fill.amount;
        if total_filled > args.order.amount {
            return Err(Error::OrderRejected { hash, reason: "cannot overfill order" });
        }

        // Fee is a rate on the fill price; convert to margin per unit position.
        let fee = base_mul(fill.fee.magnitude(), fill.price.raw_value());
        let price = fill.price.raw_value();
        let margin_per_position = if args.order.is_buy == fill.fee.is_negative() {
            price
                .checked_sub(&fee)
                .ok_or(Error::OrderRejected { hash, reason: "fill fee exceeds fill price" })?
        } else {
            price + &fee
        };

        self.filled.insert(hash, total_filled);

        Ok(TradeResult {
            margin_amount: base_mul(&fill.amount, &margin_per_position),
            position_amount: fill.amount.clone(),
            is_buy: !args.order.is_buy,
            trader_flags: TRADER_FLAG_ORDERS,
        })
    }
}
