use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use num_bigint::BigUint;
use std::sync::Arc;
use perp_settlement::config::{EngineConfig, FundingConfig};
use perp_settlement::matching::{Fill, Order, OrderArgs};
use perp_settlement::settlement::settle_account;
use perp_settlement::types::fixed::{index_base, BASE};
use perp_settlement::{
    AccountId, Balance, FundingOracle, Index, ManualClock, ManualPriceOracle, Perpetual, Price,
    SignedValue, TradeAction, TradeArg,
};

const UNIT: u128 = BASE as u128;
const T0: u64 = 1_700_000_000;

fn settle_account_benchmark(c: &mut Criterion) {
    let balance = Balance::from_i128(1_000 * UNIT as i128, -25 * UNIT as i128);
    let local = Index::initial(T0);
    let global = Index::new(T0 + 3_600, SignedValue::positive(BigUint::from(36u32) * index_base()));

    c.bench_function("settle_account", |b| {
        b.iter(|| settle_account(black_box(&balance), black_box(&local), black_box(&global)))
    });
}

fn engine() -> (Perpetual<ManualPriceOracle, FundingOracle>, ManualClock) {
    let clock = ManualClock::new(T0);
    let funding = FundingConfig {
        provider: AccountId::from_u128(1001),
        ..FundingConfig::default()
    };
    let mut perpetual = Perpetual::new(
        EngineConfig::default(),
        ManualPriceOracle::new(Price::from_raw(BigUint::from(100 * UNIT))),
        FundingOracle::new(funding, T0),
        Arc::new(clock.clone()),
    );
    for n in 1..=2u128 {
        let account = AccountId::from_u128(n);
        perpetual
            .deposit(account, account, BigUint::from(1_000_000 * UNIT))
            .expect("deposit");
    }
    (perpetual, clock)
}

fn trade_loop_benchmark(c: &mut Criterion) {
    let maker = AccountId::from_u128(1);
    let taker = AccountId::from_u128(2);
    let order = Order {
        maker,
        taker: None,
        is_buy: true,
        is_decrease_only: false,
        amount: BigUint::from(1_000 * UNIT),
        limit_price: Price::from_raw(BigUint::from(101 * UNIT)),
        trigger_price: Price::zero(),
        limit_fee: SignedValue::zero(),
        expiration: 0,
        salt: 1,
    };
    let arg = TradeArg {
        maker_index: 0,
        taker_index: 1,
        action: TradeAction::Fill(OrderArgs {
            order: order.clone(),
            fill: Fill {
                amount: BigUint::from(UNIT),
                price: Price::from_raw(BigUint::from(100 * UNIT)),
                fee: SignedValue::zero(),
            },
        }),
    };

    c.bench_function("trade_with_funding_refresh", |b| {
        b.iter_batched(
            || {
                let (mut perpetual, clock) = engine();
                perpetual.approve_order(maker, &order).expect("approve order");
                clock.advance(60);
                perpetual
            },
            |mut perpetual| {
                for _ in 0..10 {
                    perpetual
                        .trade(taker, black_box(&[maker, taker]), black_box(std::slice::from_ref(&arg)))
                        .expect("trade");
                }
                perpetual
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, settle_account_benchmark, trade_loop_benchmark);
criterion_main!(benches);
