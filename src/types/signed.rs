use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use crate::error::{Error, Result};
use crate::types::fixed::parse_decimal;

/// Sign-magnitude integer. Zero is always stored as positive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SignedRepr", into = "SignedRepr")]
pub struct SignedValue {
    magnitude: BigUint,
    is_positive: bool,
}

#[derive(Serialize, Deserialize)]
struct SignedRepr {
    magnitude: BigUint,
    is_positive: bool,
}

impl From<SignedRepr> for SignedValue {
    fn from(repr: SignedRepr) -> Self {
        SignedValue::new(repr.magnitude, repr.is_positive)
    }
}

impl From<SignedValue> for SignedRepr {
    fn from(value: SignedValue) -> Self {
        SignedRepr {
            magnitude: value.magnitude,
            is_positive: value.is_positive,
        }
    }
}

impl SignedValue {
    pub fn new(magnitude: BigUint, is_positive: bool) -> Self {
        let is_positive = is_positive || magnitude.is_zero();
        SignedValue { magnitude, is_positive }
    }

    pub fn zero() -> Self {
        SignedValue {
            magnitude: BigUint::zero(),
            is_positive: true,
        }
    }

    pub fn positive(magnitude: BigUint) -> Self {
        SignedValue::new(magnitude, true)
    }

    pub fn negative(magnitude: BigUint) -> Self {
        SignedValue::new(magnitude, false)
    }

    pub fn from_i128(value: i128) -> Self {
        SignedValue::new(BigUint::from(value.unsigned_abs()), value >= 0)
    }

    /// Parse a signed decimal such as `"-0.25"` scaled by `10^decimals`.
    pub fn parse_decimal(text: &str, decimals: u32) -> Result<Self> {
        let trimmed = text.trim();
        match trimmed.strip_prefix('-') {
            Some(rest) => Ok(SignedValue::negative(parse_decimal(rest, decimals)?)),
            None => Ok(SignedValue::positive(parse_decimal(trimmed, decimals)?)),
        }
    }

    pub fn magnitude(&self) -> &BigUint {
        &self.magnitude
    }

    pub fn into_magnitude(self) -> BigUint {
        self.magnitude
    }

    pub fn is_positive(&self) -> bool {
        self.is_positive
    }

    pub fn is_negative(&self) -> bool {
        !self.is_positive
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn to_i128(&self) -> Option<i128> {
        self.to_bigint().to_i128()
    }

    pub fn to_bigint(&self) -> BigInt {
        let sign = if self.is_positive { Sign::Plus } else { Sign::Minus };
        BigInt::from_biguint(sign, self.magnitude.clone())
    }

    pub fn negate(&self) -> SignedValue {
        SignedValue::new(self.magnitude.clone(), !self.is_positive)
    }

    pub fn add_unsigned(&self, value: &BigUint) -> SignedValue {
        self.signed_add_parts(value, true)
    }

    pub fn sub_unsigned(&self, value: &BigUint) -> SignedValue {
        self.signed_add_parts(value, false)
    }

    pub fn signed_add(&self, other: &SignedValue) -> SignedValue {
        self.signed_add_parts(&other.magnitude, other.is_positive)
    }

    pub fn signed_sub(&self, other: &SignedValue) -> SignedValue {
        self.signed_add_parts(&other.magnitude, !other.is_positive)
    }

    fn signed_add_parts(&self, magnitude: &BigUint, is_positive: bool) -> SignedValue {
        if self.is_positive == is_positive {
            return SignedValue::new(&self.magnitude + magnitude, is_positive);
        }
        if self.magnitude >= *magnitude {
            SignedValue::new(&self.magnitude - magnitude, self.is_positive)
        } else {
            SignedValue::new(magnitude - &self.magnitude, is_positive)
        }
    }
}

impl Default for SignedValue {
    fn default() -> Self {
        SignedValue::zero()
    }
}

impl Ord for SignedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_positive, other.is_positive) {
            (true, true) => self.magnitude.cmp(&other.magnitude),
            (false, false) => other.magnitude.cmp(&self.magnitude),
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
        }
    }
}

impl PartialOrd for SignedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for &SignedValue {
    type Output = SignedValue;
    fn add(self, other: &SignedValue) -> SignedValue {
        self.signed_add(other)
    }
}

impl Sub for &SignedValue {
    type Output = SignedValue;
    fn sub(self, other: &SignedValue) -> SignedValue {
        self.signed_sub(other)
    }
}

impl Neg for &SignedValue {
    type Output = SignedValue;
    fn neg(self) -> SignedValue {
        self.negate()
    }
}

impl From<BigUint> for SignedValue {
    fn from(magnitude: BigUint) -> Self {
        SignedValue::positive(magnitude)
    }
}

impl TryFrom<&SignedValue> for BigUint {
    type Error = Error;

    fn try_from(value: &SignedValue) -> Result<BigUint> {
        if value.is_negative() {
            return Err(Error::InvalidParameter(format!("expected non-negative value, got {}", value)));
        }
        Ok(value.magnitude.clone())
    }
}

impl fmt::Display for SignedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positive {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "-{}", self.magnitude)
        }
    }
}
