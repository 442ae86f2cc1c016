pub mod deleveraging;
pub mod liquidator;

pub use deleveraging::{Deleveraging, DeleveragingArgs};
pub use liquidator::{Liquidation, LiquidationArgs};
