use num_bigint::BigUint;
use crate::error::Result;
use crate::types::balance::Balance;
use crate::types::fixed::{index_base, multiply_fraction, multiply_fraction_round_up};
use crate::types::index::Index;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Local index already matches the global index.
    AlreadySettled,
    /// Local index advanced; a flat account owes nothing.
    NoPosition,
    Settled { is_credit: bool, amount: BigUint },
}

impl SettleOutcome {
    /// Whether the caller must store the global index as the account's local one.
    pub fn advances_index(&self) -> bool {
        !matches!(self, SettleOutcome::AlreadySettled)
    }
}

/// Apply the funding accrued between `local` and `global` to `balance`.
///
/// A rising index debits longs and credits shorts; a falling index does the
/// opposite. Credits round down and debits round up, so rounding never leaves
/// the system owing more than it collected. Opposite positions therefore
/// settle to equal amounts only when the product is exact; otherwise the
/// debit exceeds the credit by one base unit.
pub fn settle_account(
    balance: &Balance,
    local: &Index,
    global: &Index,
) -> Result<(Balance, SettleOutcome)> {
    if local.timestamp == global.timestamp {
        return Ok((balance.clone(), SettleOutcome::AlreadySettled));
    }

    if balance.position.is_zero() {
        return Ok((balance.clone(), SettleOutcome::NoPosition));
    }

    let index_delta = global.value.signed_sub(&local.value);
    let is_credit = index_delta.is_positive() != balance.position.is_positive();

    let mut settled = balance.clone();
    let amount = if is_credit {
        let amount = multiply_fraction(index_delta.magnitude(), balance.position.magnitude(), &index_base())?;
        settled.add_to_margin(&amount);
        amount
    } else {
        let amount = multiply_fraction_round_up(index_delta.magnitude(), balance.position.magnitude(), &index_base())?;
        settled.sub_from_margin(&amount);
        amount
    };

    Ok((settled, SettleOutcome::Settled { is_credit, amount }))
}
