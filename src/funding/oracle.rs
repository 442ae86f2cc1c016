use num_bigint::BigUint;
use std::cmp;
use crate::config::FundingConfig;
use crate::error::{Error, Result};
use crate::interfaces::funder::Funder;
use crate::types::ids::AccountId;
use crate::types::index::FundingRate;
use crate::types::signed::SignedValue;

/// Holds the current per-second funding rate and bounds how fast it moves.
///
/// A requested rate outside the allowed step is clamped to the nearest bound,
/// never rejected.
#[derive(Clone, Debug)]
pub struct FundingOracle {
    config: FundingConfig,
    rate: FundingRate,
}

impl FundingOracle {
    pub fn new(config: FundingConfig, now: u64) -> Self {
        FundingOracle {
            config,
            rate: FundingRate::initial(now),
        }
    }

    /// Rebuild from a persisted rate.
    pub fn with_rate(config: FundingConfig, rate: FundingRate) -> Self {
        FundingOracle { config, rate }
    }

    pub fn config(&self) -> &FundingConfig {
        &self.config
    }

    pub fn current_rate(&self) -> &FundingRate {
        &self.rate
    }

    pub fn set_funding_rate(
        &mut self,
        sender: AccountId,
        new_rate: SignedValue,
        now: u64,
    ) -> Result<FundingRate> {
        if sender != self.config.provider {
            return Err(Error::Unauthorized(
                "sender is not the funding rate provider".to_string(),
            ));
        }

        let bounded = self.bound_rate(&new_rate, now)?;
        if bounded != new_rate {
            tracing::warn!(
                requested = %new_rate,
                applied = %bounded,
                "Funding rate clamped to allowed range"
            );
            crate::observability::metrics::FUNDING_RATE_CLAMPS.inc();
        }

        self.rate = FundingRate::new(now, bounded);
        tracing::info!(rate = %self.rate, "Funding rate updated");
        Ok(self.rate.clone())
    }

    /// Clamp `new_rate` to `old ± min(maxDiffPerUpdate, maxDiffPerSecond × elapsed)`
    /// and to `±maxAbsValue`.
    pub fn bound_rate(&self, new_rate: &SignedValue, now: u64) -> Result<SignedValue> {
        let old_rate = &self.rate.value;
        let elapsed = now
            .checked_sub(self.rate.timestamp)
            .ok_or(Error::ClockWentBackwards {
                index_timestamp: self.rate.timestamp,
                now,
            })?;

        let max_diff = cmp::min(
            &self.config.max_abs_diff_per_second * BigUint::from(elapsed),
            self.config.max_abs_diff_per_update.clone(),
        );

        if new_rate > old_rate {
            let upper_bound = cmp::min(
                old_rate.add_unsigned(&max_diff),
                SignedValue::positive(self.config.max_abs_value.clone()),
            );
            Ok(cmp::min(new_rate.clone(), upper_bound))
        } else {
            let lower_bound = cmp::max(
                old_rate.sub_unsigned(&max_diff),
                SignedValue::negative(self.config.max_abs_value.clone()),
            );
            Ok(cmp::max(new_rate.clone(), lower_bound))
        }
    }
}

impl Funder for FundingOracle {
    fn get_funding(&self, time_delta: u64) -> Result<SignedValue> {
        let amount = self.rate.value.magnitude() * BigUint::from(time_delta);
        let is_positive = self.rate.value.is_positive() != self.config.invert;
        Ok(SignedValue::new(amount, is_positive))
    }

    fn funding_rate(&self) -> Option<&FundingRate> {
        Some(&self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDER: u128 = 7;

    fn config() -> FundingConfig {
        FundingConfig {
            provider: AccountId::from_u128(PROVIDER),
            max_abs_value: BigUint::from(1_000u32),
            max_abs_diff_per_update: BigUint::from(100u32),
            max_abs_diff_per_second: BigUint::from(10u32),
            invert: false,
        }
    }

    fn sv(v: i128) -> SignedValue {
        SignedValue::from_i128(v)
    }

    #[test]
    fn test_only_provider_may_set_rate() {
        let mut oracle = FundingOracle::new(config(), 0);
        let result = oracle.set_funding_rate(AccountId::from_u128(8), sv(5), 100);
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_rate_clamped_per_update() {
        let mut oracle = FundingOracle::new(config(), 0);
        let provider = AccountId::from_u128(PROVIDER);

        let rate = oracle.set_funding_rate(provider, sv(500), 1_000).unwrap();
        assert_eq!(rate.value, sv(100));
        assert_eq!(rate.timestamp, 1_000);

        let rate = oracle.set_funding_rate(provider, sv(-500), 2_000).unwrap();
        assert_eq!(rate.value, sv(0));
    }

    #[test]
    fn test_rate_clamped_per_second() {
        let mut oracle = FundingOracle::new(config(), 0);
        let provider = AccountId::from_u128(PROVIDER);

        // Three seconds allow a step of 30.
        let rate = oracle.set_funding_rate(provider, sv(-75), 3).unwrap();
        assert_eq!(rate.value, sv(-30));

        // No time elapsed: the rate cannot move at all.
        let rate = oracle.set_funding_rate(provider, sv(50), 3).unwrap();
        assert_eq!(rate.value, sv(-30));
    }

    #[test]
    fn test_rate_converges_within_absolute_cap() {
        let mut oracle = FundingOracle::new(config(), 0);
        let provider = AccountId::from_u128(PROVIDER);

        let mut previous = sv(0);
        for step in 1..=15u64 {
            let rate = oracle.set_funding_rate(provider, sv(5_000), step * 100).unwrap();
            let moved = rate.value.signed_sub(&previous);
            assert!(moved <= sv(100));
            previous = rate.value;
        }
        assert_eq!(previous, sv(1_000));
    }

    #[test]
    fn test_request_within_bounds_applies_exactly() {
        let mut oracle = FundingOracle::new(config(), 0);
        let provider = AccountId::from_u128(PROVIDER);
        let rate = oracle.set_funding_rate(provider, sv(42), 100).unwrap();
        assert_eq!(rate.value, sv(42));
    }

    #[test]
    fn test_get_funding_scales_with_time() {
        let oracle = FundingOracle::with_rate(config(), FundingRate::new(0, sv(-3)));
        assert_eq!(oracle.get_funding(10).unwrap(), sv(-30));

        let mut inverted = config();
        inverted.invert = true;
        let oracle = FundingOracle::with_rate(inverted, FundingRate::new(0, sv(-3)));
        assert_eq!(oracle.get_funding(10).unwrap(), sv(30));
    }

    #[test]
    fn test_zero_rate_inverted_stays_canonical() {
        let mut inverted = config();
        inverted.invert = true;
        let oracle = FundingOracle::new(inverted, 0);
        assert!(oracle.get_funding(10).unwrap().is_positive());
    }
}
