use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::signed::SignedValue;

/// A timestamped signed accumulator.
///
/// Used for the global funding index, each account's cached local index and
/// the stored funding rate. Timestamps are seconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    pub timestamp: u64,
    pub value: SignedValue,
}

impl Index {
    pub fn new(timestamp: u64, value: SignedValue) -> Self {
        Index { timestamp, value }
    }

    /// `(now, +0)`, the state of a freshly created index.
    pub fn initial(now: u64) -> Self {
        Index {
            timestamp: now,
            value: SignedValue::zero(),
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.timestamp)
    }
}

/// Per-second funding rate with 18 implied decimals.
pub type FundingRate = Index;
