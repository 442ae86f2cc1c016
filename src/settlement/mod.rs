pub mod collateral;
pub mod funding_index;
pub mod settle;

pub use collateral::{is_collateralized, is_undercollateralized, is_underwater, verify_final_balances};
pub use funding_index::{refresh_index, Context};
pub use settle::{settle_account, SettleOutcome};
