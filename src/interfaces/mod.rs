pub mod clock;
pub mod funder;
pub mod price_oracle;
pub mod trader;
