mod common;

use common::*;
use num_bigint::BigUint;
use perp_settlement::events::balance::AccountSettled;
use perp_settlement::events::Event;
use perp_settlement::invariants::InvariantChecks;
use perp_settlement::types::fixed::index_base;
use perp_settlement::{Error, Index, SignedValue};

fn settled_events(events: &[perp_settlement::events::EventRecord]) -> Vec<AccountSettled> {
    events
        .iter()
        .filter_map(|record| match &record.event {
            Event::AccountSettled(settled) => Some(settled.clone()),
            _ => None,
        })
        .collect()
}

fn index_updates(events: &[perp_settlement::events::EventRecord]) -> usize {
    events.iter().filter(|r| matches!(r.event, Event::IndexUpdated(_))).count()
}

/// Long 10 (account 1) against short 10 (account 2) at 100.
fn opened_market() -> Harness {
    let mut h = Harness::new("100");
    h.deposit(1, 1_000);
    h.deposit(2, 1_000);
    h.open(1, 2, 10, "100");
    h.perpetual.drain_events();
    h
}

#[test]
fn one_hour_funding_scenario() {
    let mut h = opened_market();
    assert_eq!(h.balance(1), balance(0, 10));
    assert_eq!(h.balance(2), balance(2_000, -10));

    h.clock.advance(3_600);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0001")).unwrap();

    // 0.0001/s for an hour at price 100: 36 per unit of position.
    h.perpetual.settle_accounts(&[id(1)]).unwrap();
    let expected_index = Index::new(T0 + 3_600, SignedValue::positive(BigUint::from(36u32) * index_base()));
    assert_eq!(h.perpetual.get_global_index(), &expected_index);
    assert_eq!(h.balance(1), balance(-360, 10));

    h.perpetual.settle_accounts(&[id(2)]).unwrap();
    assert_eq!(h.balance(2), balance(2_360, -10));

    let settled = settled_events(h.perpetual.events());
    assert_eq!(settled.len(), 2);
    assert_eq!((settled[0].account, settled[0].is_credit, settled[0].amount.clone()), (id(1), false, units(360)));
    assert_eq!((settled[1].account, settled[1].is_credit, settled[1].amount.clone()), (id(2), true, units(360)));
}

#[test]
fn negative_funding_pays_longs() {
    let mut h = opened_market();
    h.clock.advance(3_600);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("-0.0001")).unwrap();
    h.perpetual.settle_accounts(&[id(1), id(2)]).unwrap();

    assert_eq!(h.balance(1), balance(360, 10));
    assert_eq!(h.balance(2), balance(1_640, -10));
}

#[test]
fn settlement_is_idempotent_within_a_timestamp() {
    let mut h = opened_market();
    h.clock.advance(600);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0001")).unwrap();

    let first = h.perpetual.settle_accounts(&[id(1)]).unwrap();
    h.perpetual.drain_events();
    let second = h.perpetual.settle_accounts(&[id(1)]).unwrap();

    assert_eq!(first, second);
    assert!(settled_events(h.perpetual.events()).is_empty());
    assert_eq!(index_updates(h.perpetual.events()), 0);
}

#[test]
fn zero_position_advances_index_only() {
    let mut h = opened_market();
    h.deposit(3, 50);
    h.clock.advance(1_200);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0002")).unwrap();

    h.perpetual.settle_accounts(&[id(3)]).unwrap();
    assert_eq!(h.balance(3), balance(50, 0));
    assert_eq!(h.perpetual.get_account_index(&id(3)), h.perpetual.get_global_index().clone());
    assert!(settled_events(h.perpetual.events()).is_empty());
}

#[test]
fn funding_is_zero_sum_between_counterparties() {
    let mut h = opened_market();
    h.deposit(3, 500);
    h.deposit(4, 500);
    h.open(3, 4, 3, "100");

    for (seconds, rate) in [(100, "0.00005"), (250, "-0.00002"), (77, "0.00001")] {
        h.clock.advance(seconds);
        h.perpetual.set_funding_rate(id(PROVIDER), signed(rate)).unwrap();
        h.perpetual.settle_accounts(&[id(1), id(2), id(3), id(4)]).unwrap();
    }

    let total = (1..=4).fold(SignedValue::zero(), |acc, n| acc.signed_add(&h.balance(n).margin));
    assert_eq!(total, SignedValue::positive(units(3_000)));
    assert!(InvariantChecks::check_all(h.perpetual.state(), T0 + 427).is_ok());
}

#[test]
fn index_event_only_when_index_moves() {
    let mut h = Harness::new("100");
    h.deposit(1, 10);
    h.deposit(2, 10);
    assert_eq!(index_updates(h.perpetual.events()), 0);

    h.clock.advance(5);
    h.deposit(1, 10);
    h.deposit(2, 10);
    assert_eq!(index_updates(h.perpetual.events()), 1);
}

#[test]
fn funding_rate_steps_are_bounded() {
    let mut h = Harness::new("100");
    let step = signed("0.0001");
    let mut previous = SignedValue::zero();
    for _ in 0..8 {
        h.clock.advance(100);
        let rate = h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0005")).unwrap();
        assert!(rate.value.signed_sub(&previous) <= step);
        previous = rate.value;
    }
    assert_eq!(previous, signed("0.0005"));

    let rejected = h.perpetual.set_funding_rate(id(1), signed("0"));
    assert!(matches!(rejected, Err(Error::Unauthorized(_))));
}

#[test]
fn price_outage_rolls_back_everything() {
    let mut h = opened_market();
    h.clock.advance(3_600);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0001")).unwrap();
    h.perpetual.drain_events();
    h.feed.clear();

    let index_before = h.perpetual.get_global_index().clone();
    let vault_before = h.perpetual.get_vault_balance().clone();
    let result = h.perpetual.deposit(id(1), id(1), units(5));

    assert!(matches!(result, Err(Error::PriceUnavailable(_))));
    assert_eq!(h.perpetual.get_global_index(), &index_before);
    assert_eq!(h.perpetual.get_vault_balance(), &vault_before);
    assert_eq!(h.balance(1), balance(0, 10));
    assert!(h.perpetual.events().is_empty());
}

#[test]
fn failed_trade_keeps_index_and_settlements_uncommitted() {
    let mut h = opened_market();
    h.clock.advance(3_600);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0001")).unwrap();
    h.perpetual.drain_events();
    let index_before = h.perpetual.get_global_index().clone();

    // Account 2 shorting another 100 at 100 cannot be collateralized.
    let order = h.approved_order(1, true, 100, "100");
    let result = h.fill(&order, 2, 100, "100");
    assert!(matches!(result, Err(Error::Undercollateralized { .. })));

    assert_eq!(h.perpetual.get_global_index(), &index_before);
    assert_eq!(h.perpetual.get_account_index(&id(1)).timestamp, T0);
    assert_eq!(h.balance(1), balance(0, 10));
    assert_eq!(h.perpetual.get_order_filled_amount(&order.hash()), BigUint::default());
}

#[test]
fn storage_overflow_rejects_operation() {
    let mut h = Harness::new("100");
    let too_big = BigUint::from(1u32) << 120;
    let result = h.perpetual.deposit(id(1), id(1), too_big);

    assert!(matches!(result, Err(Error::Overflow { .. })));
    assert_eq!(h.perpetual.get_vault_balance(), &BigUint::default());
    assert_eq!(h.balance(1), balance(0, 0));
}

#[test]
fn trade_rejects_malformed_account_lists() {
    let mut h = opened_market();
    let order = h.approved_order(1, true, 1, "100");
    let arg = perp_settlement::TradeArg {
        maker_index: 0,
        taker_index: 5,
        action: perp_settlement::TradeAction::Fill(perp_settlement::matching::OrderArgs {
            order,
            fill: perp_settlement::matching::Fill {
                amount: units(1),
                price: price("100"),
                fee: SignedValue::zero(),
            },
        }),
    };

    assert!(matches!(h.perpetual.trade(id(2), &[], &[]), Err(Error::InvalidAccounts)));
    assert!(matches!(h.perpetual.trade(id(2), &[id(2), id(1)], &[]), Err(Error::InvalidAccounts)));
    assert!(matches!(h.perpetual.trade(id(2), &[id(1), id(1)], &[]), Err(Error::InvalidAccounts)));
    assert!(matches!(
        h.perpetual.trade(id(2), &[id(1), id(2)], &[arg]),
        Err(Error::AccountIndexOutOfRange { index: 5, len: 2 })
    ));
}
