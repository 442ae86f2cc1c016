use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::fixed::base;
use crate::types::price::Price;
use crate::types::signed::SignedValue;

/// Per-account margin and position. Both carry 18 implied decimals.
///
/// Positive position is long, negative is short. Margin may go negative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Balance {
    pub margin: SignedValue,
    pub position: SignedValue,
}

impl Balance {
    pub fn zero() -> Self {
        Balance::default()
    }

    pub fn new(margin: SignedValue, position: SignedValue) -> Self {
        Balance { margin, position }
    }

    pub fn from_i128(margin: i128, position: i128) -> Self {
        Balance {
            margin: SignedValue::from_i128(margin),
            position: SignedValue::from_i128(position),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.margin.is_zero() && self.position.is_zero()
    }

    pub fn add_to_margin(&mut self, amount: &BigUint) {
        self.margin = self.margin.add_unsigned(amount);
    }

    pub fn sub_from_margin(&mut self, amount: &BigUint) {
        self.margin = self.margin.sub_unsigned(amount);
    }

    pub fn add_to_position(&mut self, amount: &BigUint) {
        self.position = self.position.add_unsigned(amount);
    }

    pub fn sub_from_position(&mut self, amount: &BigUint) {
        self.position = self.position.sub_unsigned(amount);
    }

    /// Split the account's worth at `price` into its two ledger sides.
    ///
    /// Both values carry 36 implied decimals: margin is scaled by the base and
    /// position is multiplied by the 18-decimal price.
    pub fn get_positive_and_negative_value(&self, price: &Price) -> (BigUint, BigUint) {
        let mut positive = BigUint::zero();
        let mut negative = BigUint::zero();

        let margin_value = self.margin.magnitude() * base();
        if self.margin.is_positive() {
            positive += margin_value;
        } else {
            negative += margin_value;
        }

        let position_value = self.position.magnitude() * price.raw_value();
        if self.position.is_positive() {
            positive += position_value;
        } else {
            negative += position_value;
        }

        (positive, negative)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(margin={}, position={})", self.margin, self.position)
    }
}
