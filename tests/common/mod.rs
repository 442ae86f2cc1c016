#![allow(dead_code)]

use num_bigint::BigUint;
use std::sync::Arc;
use perp_settlement::config::{DeleveragingConfig, EngineConfig, FundingConfig, RiskConfig};
use perp_settlement::liquidation::{DeleveragingArgs, LiquidationArgs};
use perp_settlement::matching::{Fill, Order, OrderArgs};
use perp_settlement::types::fixed::{parse_decimal, DECIMALS};
use perp_settlement::{
    AccountId, Balance, FundingOracle, ManualClock, ManualPriceOracle, Perpetual, Price, SignedValue,
    TradeAction, TradeArg,
};

pub const UNIT: u128 = 1_000_000_000_000_000_000;
pub const T0: u64 = 1_700_000_000;

pub const ADMIN: u128 = 1000;
pub const PROVIDER: u128 = 1001;
pub const OPERATOR: u128 = 1002;

pub fn id(n: u128) -> AccountId {
    AccountId::from_u128(n)
}

pub fn units(n: u128) -> BigUint {
    BigUint::from(n * UNIT)
}

pub fn decimal(text: &str) -> BigUint {
    parse_decimal(text, DECIMALS).unwrap()
}

pub fn price(text: &str) -> Price {
    Price::from_decimal_str(text).unwrap()
}

pub fn signed(text: &str) -> SignedValue {
    SignedValue::parse_decimal(text, DECIMALS).unwrap()
}

/// `(margin, position)` in whole units.
pub fn balance(margin: i128, position: i128) -> Balance {
    let unit = UNIT as i128;
    Balance::from_i128(margin * unit, position * unit)
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        risk: RiskConfig {
            admin: id(ADMIN),
            min_collateral: decimal("1.075"),
        },
        deleveraging: DeleveragingConfig {
            operator: id(OPERATOR),
            timelock_seconds: 1800,
        },
    }
}

/// Wide enough bounds that test rates apply unclamped after a few seconds.
pub fn funding_config() -> FundingConfig {
    FundingConfig {
        provider: id(PROVIDER),
        max_abs_value: decimal("0.001"),
        max_abs_diff_per_update: decimal("0.001"),
        max_abs_diff_per_second: decimal("0.000001"),
        invert: false,
    }
}

pub struct Harness {
    pub perpetual: Perpetual<ManualPriceOracle, FundingOracle>,
    pub clock: ManualClock,
    pub feed: ManualPriceOracle,
}

impl Harness {
    pub fn new(mark: &str) -> Self {
        let clock = ManualClock::new(T0);
        let feed = ManualPriceOracle::new(price(mark));
        let funder = FundingOracle::new(funding_config(), T0);
        let perpetual = Perpetual::new(engine_config(), feed.clone(), funder, Arc::new(clock.clone()));
        Harness { perpetual, clock, feed }
    }

    pub fn deposit(&mut self, account: u128, amount: u128) {
        self.perpetual.deposit(id(account), id(account), units(amount)).unwrap();
    }

    pub fn balance(&self, account: u128) -> Balance {
        self.perpetual.get_account_balance(&id(account))
    }

    /// Approve an order for `maker` and return it.
    pub fn approved_order(&mut self, maker: u128, is_buy: bool, amount: u128, limit: &str) -> Order {
        let order = order(maker, is_buy, amount, limit);
        self.perpetual.approve_order(id(maker), &order).unwrap();
        order
    }

    /// Taker fills `amount` of `order` at `fill_price` with no fee.
    pub fn fill(&mut self, order: &Order, taker: u128, amount: u128, fill_price: &str) -> perp_settlement::Result<Vec<Balance>> {
        let maker = order.maker;
        let (accounts, maker_index, taker_index) = sorted_pair(maker, id(taker));
        let arg = TradeArg {
            maker_index,
            taker_index,
            action: TradeAction::Fill(OrderArgs {
                order: order.clone(),
                fill: Fill {
                    amount: units(amount),
                    price: price(fill_price),
                    fee: SignedValue::zero(),
                },
            }),
        };
        self.perpetual.trade(id(taker), &accounts, &[arg])
    }

    /// Open `maker` long and `taker` short by `amount` at `at`.
    pub fn open(&mut self, long: u128, short: u128, amount: u128, at: &str) {
        let order = self.approved_order(long, true, amount, at);
        self.fill(&order, short, amount, at).unwrap();
    }

    pub fn liquidate(&mut self, sender: u128, maker: u128, taker: u128, args: LiquidationArgs) -> perp_settlement::Result<Vec<Balance>> {
        let (accounts, maker_index, taker_index) = sorted_pair(id(maker), id(taker));
        let arg = TradeArg { maker_index, taker_index, action: TradeAction::Liquidate(args) };
        self.perpetual.trade(id(sender), &accounts, &[arg])
    }

    pub fn deleverage(&mut self, sender: u128, maker: u128, taker: u128, args: DeleveragingArgs) -> perp_settlement::Result<Vec<Balance>> {
        let (accounts, maker_index, taker_index) = sorted_pair(id(maker), id(taker));
        let arg = TradeArg { maker_index, taker_index, action: TradeAction::Deleverage(args) };
        self.perpetual.trade(id(sender), &accounts, &[arg])
    }
}

pub fn order(maker: u128, is_buy: bool, amount: u128, limit: &str) -> Order {
    Order {
        maker: id(maker),
        taker: None,
        is_buy,
        is_decrease_only: false,
        amount: units(amount),
        limit_price: price(limit),
        trigger_price: Price::zero(),
        limit_fee: SignedValue::zero(),
        expiration: 0,
        salt: 0,
    }
}

/// Sorted account list plus the indexes of `maker` and `taker` in it.
pub fn sorted_pair(maker: AccountId, taker: AccountId) -> (Vec<AccountId>, usize, usize) {
    if maker == taker {
        (vec![maker], 0, 0)
    } else if maker < taker {
        (vec![maker, taker], 0, 1)
    } else {
        (vec![taker, maker], 1, 0)
    }
}
