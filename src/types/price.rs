use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::Result;
use crate::types::fixed::{format_decimal, parse_decimal, DECIMALS};

/// Mark price with 18 implied decimals: margin units per unit of position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(BigUint);

impl Price {
    pub fn from_raw(value: BigUint) -> Self {
        Price(value)
    }

    pub fn from_decimal_str(text: &str) -> Result<Self> {
        Ok(Price(parse_decimal(text, DECIMALS)?))
    }

    pub fn raw_value(&self) -> &BigUint {
        &self.0
    }

    pub fn zero() -> Self {
        Price(BigUint::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_decimal(&self.0, DECIMALS))
    }
}
