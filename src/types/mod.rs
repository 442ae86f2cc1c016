pub mod balance;
pub mod fixed;
pub mod ids;
pub mod index;
pub mod price;
pub mod signed;
