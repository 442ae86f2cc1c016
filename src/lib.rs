pub mod types;
pub mod settlement;
pub mod funding;
pub mod liquidation;
pub mod matching;
pub mod invariants;
pub mod core;
pub mod error;
pub mod config;
pub mod events;
pub mod storage;
pub mod observability;
pub mod interfaces;

pub use crate::core::{Perpetual, TradeAction, TradeArg};
pub use crate::error::{Error, Result};
pub use crate::funding::FundingOracle;
pub use crate::interfaces::clock::{Clock, ManualClock, SystemClock};
pub use crate::interfaces::funder::Funder;
pub use crate::interfaces::price_oracle::{ManualPriceOracle, PriceOracle};
pub use crate::types::balance::Balance;
pub use crate::types::ids::{AccountId, OrderHash};
pub use crate::types::index::{FundingRate, Index};
pub use crate::types::price::Price;
pub use crate::types::signed::SignedValue;
