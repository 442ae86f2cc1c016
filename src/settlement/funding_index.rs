use num_bigint::BigUint;
use crate::error::{Error, Result};
use crate::interfaces::funder::Funder;
use crate::types::index::Index;
use crate::types::price::Price;

/// Per-operation view of market parameters, loaded once before any account
/// is settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub price: Price,
    pub min_collateral: BigUint,
    pub index: Index,
}

/// Advance the global funding index to `now`.
///
/// Accrues `funding(now - timestamp) × price` into the index, keeping the full
/// 36-decimal product. Returns the current index unchanged when no time has
/// passed, so repeated calls within one timestamp are no-ops.
pub fn refresh_index<F: Funder + ?Sized>(
    current: &Index,
    now: u64,
    price: &Price,
    funder: &F,
) -> Result<Index> {
    let time_delta = now
        .checked_sub(current.timestamp)
        .ok_or(Error::ClockWentBackwards {
            index_timestamp: current.timestamp,
            now,
        })?;

    if time_delta == 0 {
        return Ok(current.clone());
    }

    let funding = funder.get_funding(time_delta)?;
    let accrual = funding.magnitude() * price.raw_value();
    let value = if funding.is_positive() {
        current.value.add_unsigned(&accrual)
    } else {
        current.value.sub_unsigned(&accrual)
    };

    tracing::debug!(
        time_delta,
        funding = %funding,
        price = %price,
        index = %value,
        "Funding index refreshed"
    );

    Ok(Index::new(now, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::signed::SignedValue;
    use std::cell::Cell;

    struct RecordingFunder {
        rate: i128,
        calls: Cell<u32>,
    }

    impl Funder for RecordingFunder {
        fn get_funding(&self, time_delta: u64) -> Result<SignedValue> {
            self.calls.set(self.calls.get() + 1);
            Ok(SignedValue::from_i128(self.rate * time_delta as i128))
        }
    }

    struct FailingFunder;

    impl Funder for FailingFunder {
        fn get_funding(&self, _time_delta: u64) -> Result<SignedValue> {
            Err(Error::FundingUnavailable("offline".to_string()))
        }
    }

    fn price(v: u32) -> Price {
        Price::from_raw(BigUint::from(v))
    }

    #[test]
    fn test_refresh_accrues_rate_times_price() {
        let funder = RecordingFunder { rate: 3, calls: Cell::new(0) };
        let index = refresh_index(&Index::initial(100), 110, &price(7), &funder).unwrap();
        assert_eq!(index, Index::new(110, SignedValue::from_i128(210)));
    }

    #[test]
    fn test_negative_funding_decreases_index() {
        let funder = RecordingFunder { rate: -2, calls: Cell::new(0) };
        let start = Index::new(0, SignedValue::from_i128(5));
        let index = refresh_index(&start, 10, &price(1), &funder).unwrap();
        assert_eq!(index.value, SignedValue::from_i128(-15));
    }

    #[test]
    fn test_refresh_same_timestamp_is_noop() {
        let funder = RecordingFunder { rate: 3, calls: Cell::new(0) };
        let start = Index::new(50, SignedValue::from_i128(9));
        let index = refresh_index(&start, 50, &price(7), &funder).unwrap();
        assert_eq!(index, start);
        assert_eq!(funder.calls.get(), 0);
    }

    #[test]
    fn test_refresh_rejects_clock_going_backwards() {
        let funder = RecordingFunder { rate: 3, calls: Cell::new(0) };
        let result = refresh_index(&Index::initial(50), 49, &price(7), &funder);
        assert!(matches!(result, Err(Error::ClockWentBackwards { .. })));
    }

    #[test]
    fn test_refresh_propagates_funder_failure() {
        let result = refresh_index(&Index::initial(0), 10, &price(7), &FailingFunder);
        assert!(matches!(result, Err(Error::FundingUnavailable(_))));
    }
}
