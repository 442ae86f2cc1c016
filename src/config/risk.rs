use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use crate::types::fixed::{base, parse_decimal, DECIMALS};
use crate::types::ids::AccountId;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RiskConfig {
    /// Account allowed to run admin operations.
    pub admin: AccountId,
    /// Minimum collateralization ratio, 18-decimal (1.075 = 107.5%).
    #[serde(with = "crate::types::fixed::decimal_18")]
    pub min_collateral: BigUint,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            admin: AccountId::default(),
            min_collateral: parse_decimal("1.075", DECIMALS).unwrap_or_else(|_| base()),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeleveragingConfig {
    /// May deleverage without the mark timelock and without taker permissions.
    pub operator: AccountId,
    pub timelock_seconds: u64,
}

impl Default for DeleveragingConfig {
    fn default() -> Self {
        DeleveragingConfig {
            operator: AccountId::default(),
            timelock_seconds: 1800,  // 30 minutes
        }
    }
}
