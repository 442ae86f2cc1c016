use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::types::fixed::{parse_decimal, DECIMALS};
use crate::types::ids::AccountId;

/// Bounds on the per-second funding rate, all 18-decimal.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FundingConfig {
    /// Only this account may publish new funding rates.
    pub provider: AccountId,
    #[serde(with = "crate::types::fixed::decimal_18")]
    pub max_abs_value: BigUint,
    #[serde(with = "crate::types::fixed::decimal_18")]
    pub max_abs_diff_per_update: BigUint,
    #[serde(with = "crate::types::fixed::decimal_18")]
    pub max_abs_diff_per_second: BigUint,
    /// Report funding with the opposite sign (inverse markets).
    pub invert: bool,
}

impl Default for FundingConfig {
    fn default() -> Self {
        // 0.75% per 8 hours, expressed per second.
        let max_abs_value = parse_decimal("0.0075", DECIMALS).unwrap_or_default() / BigUint::from(28_800u32);
        FundingConfig {
            provider: AccountId::default(),
            max_abs_diff_per_update: max_abs_value.clone(),
            // Full swing from zero to the cap takes one hour.
            max_abs_diff_per_second: &max_abs_value / BigUint::from(3_600u32),
            max_abs_value,
            invert: false,
        }
    }
}
