pub mod admin;
pub mod final_settlement;
pub mod margin;
pub mod perpetual;
pub mod state;
pub mod trade;
pub mod traders;

pub use perpetual::Perpetual;
pub use state::{AccountState, FinalSettlement, PerpetualState, Transaction};
pub use trade::{TradeAction, TradeArg};
