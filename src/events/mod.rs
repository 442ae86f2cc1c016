pub mod admin;
pub mod balance;
pub mod base;
pub mod funding;
pub mod liquidation;
pub mod log;
pub mod order;
pub mod trade;

pub use base::{Event, EventRecord};
pub use log::EventLog;
