pub mod orders;

pub use orders::{Fill, Order, OrderArgs, OrderStatus, Orders};
