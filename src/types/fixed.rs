//! Exact fixed-point helpers over arbitrary-precision magnitudes.
//!
//! Prices, margin, position sizes, funding rates and collateral ratios carry
//! 18 implied decimals. The funding index carries 36 (an 18-decimal rate
//! multiplied by an 18-decimal price, kept unrounded).

use num_bigint::BigUint;
use num_traits::{One, Zero};
use crate::error::{Error, Result};

pub const DECIMALS: u32 = 18;
pub const INDEX_DECIMALS: u32 = 36;

/// 10^18
pub const BASE: u64 = 1_000_000_000_000_000_000;

/// 10^36
pub const INDEX_BASE: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;

pub fn base() -> BigUint {
    BigUint::from(BASE)
}

pub fn index_base() -> BigUint {
    BigUint::from(INDEX_BASE)
}

/// `base * numerator / divisor`, truncating toward zero.
pub fn multiply_fraction(base: &BigUint, numerator: &BigUint, divisor: &BigUint) -> Result<BigUint> {
    if divisor.is_zero() {
        return Err(Error::DivisionByZero);
    }
    Ok(base * numerator / divisor)
}

/// `base * numerator / divisor`, rounding away from zero.
pub fn multiply_fraction_round_up(
    base: &BigUint,
    numerator: &BigUint,
    divisor: &BigUint,
) -> Result<BigUint> {
    if divisor.is_zero() {
        return Err(Error::DivisionByZero);
    }
    let product = base * numerator;
    if product.is_zero() {
        return Ok(BigUint::zero());
    }
    Ok((product - BigUint::one()) / divisor + BigUint::one())
}

/// Multiply by an 18-decimal fraction, truncating.
pub fn base_mul(value: &BigUint, base_value: &BigUint) -> BigUint {
    value * base_value / base()
}

pub fn base_mul_round_up(value: &BigUint, base_value: &BigUint) -> BigUint {
    let product = value * base_value;
    if product.is_zero() {
        return product;
    }
    (product - BigUint::one()) / base() + BigUint::one()
}

/// Divide by an 18-decimal fraction, truncating.
pub fn base_div(value: &BigUint, base_value: &BigUint) -> Result<BigUint> {
    multiply_fraction(value, &base(), base_value)
}

pub fn pow10(decimals: u32) -> BigUint {
    BigUint::from(10u32).pow(decimals)
}

/// Parse a non-negative decimal such as `"1.075"` into an integer scaled by
/// `10^decimals`. More fractional digits than `decimals` is an error.
pub fn parse_decimal(text: &str, decimals: u32) -> Result<BigUint> {
    let trimmed = text.trim();
    let invalid = || Error::InvalidDecimal(text.to_string());

    let (integer_part, fractional_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if integer_part.is_empty() || !integer_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if !fractional_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if fractional_part.len() > decimals as usize {
        return Err(invalid());
    }

    let integer = BigUint::parse_bytes(integer_part.as_bytes(), 10).ok_or_else(invalid)?;
    let fraction = if fractional_part.is_empty() {
        BigUint::zero()
    } else {
        BigUint::parse_bytes(fractional_part.as_bytes(), 10).ok_or_else(invalid)?
    };

    let missing_digits = decimals - fractional_part.len() as u32;
    Ok(integer * pow10(decimals) + fraction * pow10(missing_digits))
}

/// Render a scaled integer as a decimal string without trailing zeros.
pub fn format_decimal(value: &BigUint, decimals: u32) -> String {
    let digits = value.to_str_radix(10);
    let width = decimals as usize + 1;
    let padded = if digits.len() < width {
        format!("{}{}", "0".repeat(width - digits.len()), digits)
    } else {
        digits
    };

    let split = padded.len() - decimals as usize;
    let (integer, fraction) = padded.split_at(split);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fraction)
    }
}

/// Serde adapter storing an 18-decimal magnitude as a human-readable string.
pub mod decimal_18 {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_decimal(value, super::DECIMALS))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_decimal(&text, super::DECIMALS).map_err(serde::de::Error::custom)
    }
}
