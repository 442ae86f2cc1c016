use crate::error::Result;
use crate::types::index::FundingRate;
use crate::types::signed::SignedValue;

/// Source of funding accrued over an interval.
///
/// Returns an 18-decimal, price-independent amount per unit of position; the
/// engine scales it by the mark price before folding it into the index.
pub trait Funder {
    fn get_funding(&self, time_delta: u64) -> Result<SignedValue>;

    /// Stored rate, for sources that keep one.
    fn funding_rate(&self) -> Option<&FundingRate> {
        None
    }
}
