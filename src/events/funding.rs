use serde::{Deserialize, Serialize};
use crate::types::index::{FundingRate, Index};
use crate::types::signed::SignedValue;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexUpdated {
    pub index: Index,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingRateUpdated {
    pub rate: FundingRate,
    /// Rate as submitted, before clamping.
    pub requested: SignedValue,
}
