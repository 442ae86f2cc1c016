mod common;

use common::*;
use num_bigint::BigUint;
use std::sync::Arc;
use perp_settlement::storage::Snapshot;
use perp_settlement::{Error, Perpetual};

fn leveraged_long() -> Harness {
    let mut h = Harness::new("100");
    h.deposit(1, 100);
    h.deposit(2, 1_000);
    h.open(1, 2, 10, "100");
    h
}

#[test]
fn enabling_requires_admin_and_price_in_bounds() {
    let mut h = leveraged_long();

    let result = h.perpetual.enable_final_settlement(id(1), price("90"), price("110"));
    assert!(matches!(result, Err(Error::Unauthorized(_))));

    let result = h.perpetual.enable_final_settlement(id(ADMIN), price("101"), price("110"));
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert!(!h.perpetual.get_final_settlement_enabled());

    let frozen = h.perpetual.enable_final_settlement(id(ADMIN), price("100"), price("100")).unwrap();
    assert_eq!(frozen.price, price("100"));
    assert!(h.perpetual.get_final_settlement_enabled());
}

#[test]
fn final_settlement_blocks_regular_operations() {
    let mut h = leveraged_long();
    h.perpetual.enable_final_settlement(id(ADMIN), price("90"), price("110")).unwrap();

    assert!(matches!(h.perpetual.deposit(id(1), id(1), units(1)), Err(Error::FinalSettlementEnabled)));
    assert!(matches!(h.perpetual.withdraw(id(2), id(2), id(2), units(1)), Err(Error::FinalSettlementEnabled)));
    assert!(matches!(h.perpetual.settle_accounts(&[id(1)]), Err(Error::FinalSettlementEnabled)));
    let order = order(1, true, 1, "100");
    assert!(matches!(h.fill(&order, 2, 1, "100"), Err(Error::FinalSettlementEnabled)));
}

#[test]
fn withdraw_requires_final_settlement() {
    let mut h = leveraged_long();
    assert!(matches!(
        h.perpetual.withdraw_final_settlement(id(1)),
        Err(Error::FinalSettlementNotEnabled)
    ));
}

#[test]
fn accounts_cash_out_at_frozen_price() {
    let mut h = leveraged_long();
    h.perpetual.enable_final_settlement(id(ADMIN), price("90"), price("110")).unwrap();

    // A later oracle move has no effect on the payout.
    h.feed.set_price(price("50"));
    h.clock.advance(3_600);

    assert_eq!(h.perpetual.withdraw_final_settlement(id(1)).unwrap(), units(100));
    assert_eq!(h.perpetual.withdraw_final_settlement(id(2)).unwrap(), units(1_000));
    assert_eq!(h.balance(1), balance(0, 0));
    assert_eq!(h.balance(2), balance(0, 0));
    assert_eq!(h.perpetual.get_vault_balance(), &BigUint::default());

    // Nothing left to pay a second time.
    assert_eq!(h.perpetual.withdraw_final_settlement(id(1)).unwrap(), BigUint::default());
}

#[test]
fn vault_shortfall_stays_on_the_account() {
    let mut h = leveraged_long();
    h.feed.set_price(price("50"));
    h.perpetual.enable_final_settlement(id(ADMIN), price("40"), price("60")).unwrap();

    // The short is worth 1500 but the vault only holds 1100.
    assert_eq!(h.perpetual.withdraw_final_settlement(id(2)).unwrap(), units(1_100));
    assert_eq!(h.balance(2), balance(400, 0));

    // The long is underwater at 50, receives nothing and keeps its debt.
    assert_eq!(h.perpetual.withdraw_final_settlement(id(1)).unwrap(), BigUint::default());
    assert_eq!(h.balance(1), balance(-900, 10));
    assert_eq!(h.perpetual.withdraw_final_settlement(id(2)).unwrap(), BigUint::default());
    assert_eq!(h.balance(2), balance(400, 0));
}

#[test]
fn snapshot_restore_resumes_state_and_sequence() {
    let mut h = leveraged_long();
    h.perpetual.set_global_operator(id(ADMIN), id(7), true).unwrap();
    h.clock.advance(600);
    h.perpetual.set_funding_rate(id(PROVIDER), signed("0.0001")).unwrap();
    h.perpetual.settle_accounts(&[id(1)]).unwrap();

    let snapshot = h.perpetual.snapshot().unwrap();
    let bytes = snapshot.to_bytes().unwrap();
    let decoded = Snapshot::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.sequence, h.perpetual.events().len() as u64);

    let mut restored = Perpetual::restore_with_funding(
        engine_config(),
        funding_config(),
        h.feed.clone(),
        Arc::new(h.clock.clone()),
        &decoded,
    )
    .unwrap();

    assert_eq!(restored.get_global_index(), h.perpetual.get_global_index());
    assert_eq!(restored.get_funding_rate(), h.perpetual.get_funding_rate());
    assert_eq!(restored.get_account_balance(&id(1)), h.balance(1));
    assert_eq!(restored.get_account_index(&id(2)), h.perpetual.get_account_index(&id(2)));
    assert_eq!(restored.get_vault_balance(), h.perpetual.get_vault_balance());
    assert!(restored.get_is_global_operator(&id(7)));

    // Both engines settle account 2 identically from here.
    let expected = h.perpetual.settle_accounts(&[id(2)]).unwrap();
    assert_eq!(restored.settle_accounts(&[id(2)]).unwrap(), expected);
    assert_eq!(expected[0], balance(2_060, -10));

    restored.deposit(id(1), id(1), units(1)).unwrap();
    let first = &restored.events()[0];
    assert_eq!(first.sequence, decoded.sequence);
    assert!(first.verify_checksum());
}

#[test]
fn tampered_snapshot_is_rejected() {
    let h = leveraged_long();
    let mut snapshot = h.perpetual.snapshot().unwrap();
    snapshot.vault_balance += 1u32;
    let bytes = snapshot.to_bytes().unwrap();
    assert!(matches!(Snapshot::from_bytes(&bytes), Err(Error::InvalidChecksum)));
}
