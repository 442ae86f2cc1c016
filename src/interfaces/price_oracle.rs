use std::sync::{Arc, RwLock};
use crate::error::{Error, Result};
use crate::types::price::Price;

/// Source of the mark price used for funding accrual and collateral checks.
///
/// Queried fresh on every index refresh; the engine never caches it.
pub trait PriceOracle {
    fn get_price(&self) -> Result<Price>;
}

/// Operator-fed price. Clones share the same feed; an empty feed models an
/// unreachable source.
#[derive(Clone, Debug, Default)]
pub struct ManualPriceOracle {
    price: Arc<RwLock<Option<Price>>>,
}

impl ManualPriceOracle {
    pub fn new(price: Price) -> Self {
        ManualPriceOracle {
            price: Arc::new(RwLock::new(Some(price))),
        }
    }

    pub fn unavailable() -> Self {
        ManualPriceOracle::default()
    }

    pub fn set_price(&self, price: Price) {
        let mut guard = self.price.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(price);
    }

    pub fn clear(&self) {
        let mut guard = self.price.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }
}

impl PriceOracle for ManualPriceOracle {
    fn get_price(&self) -> Result<Price> {
        let guard = self.price.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .clone()
            .ok_or_else(|| Error::PriceUnavailable("no price has been published".to_string()))
    }
}
