use num_bigint::BigUint;
use num_traits::Zero;
use crate::error::{Error, Result};
use crate::settlement::funding_index::Context;
use crate::types::balance::Balance;
use crate::types::fixed::base;
use crate::types::ids::AccountId;
use crate::types::price::Price;

/// `positive × 1.0 >= negative × min_collateral`, both sides at `price`.
pub fn is_collateralized(balance: &Balance, price: &Price, min_collateral: &BigUint) -> bool {
    let (positive, negative) = balance.get_positive_and_negative_value(price);
    positive * base() >= negative * min_collateral
}

pub fn is_undercollateralized(balance: &Balance, price: &Price, min_collateral: &BigUint) -> bool {
    !is_collateralized(balance, price, min_collateral)
}

/// Liabilities exceed assets outright, regardless of the collateral ratio.
pub fn is_underwater(balance: &Balance, price: &Price) -> bool {
    let (positive, negative) = balance.get_positive_and_negative_value(price);
    positive < negative
}

/// Post-trade check over every account of a trade call.
///
/// An account that ends undercollateralized is still accepted when the trade
/// strictly de-risked it: it keeps positive value, its position shrank
/// without flipping, it was already undercollateralized, and its
/// collateralization ratio did not fall. Exempt accounts (liquidation and
/// deleveraging targets) are skipped.
pub fn verify_final_balances(
    context: &Context,
    accounts: &[AccountId],
    initial: &[Balance],
    current: &[Balance],
    exempt: &[bool],
) -> Result<()> {
    for (i, account) in accounts.iter().enumerate() {
        if exempt[i] {
            continue;
        }

        let current_balance = &current[i];
        let (current_pos, current_neg) = current_balance.get_positive_and_negative_value(&context.price);
        if &current_pos * base() >= &current_neg * &context.min_collateral {
            continue;
        }

        let initial_balance = &initial[i];
        let (initial_pos, initial_neg) = initial_balance.get_positive_and_negative_value(&context.price);

        let reject = |reason: &'static str| {
            tracing::warn!(account = %account, reason, "Final balance check failed");
            Err(Error::Undercollateralized { account: *account, reason })
        };

        if current_pos.is_zero() {
            return reject("account is undercollateralized and has no positive value");
        }
        if current_balance.position.magnitude() > initial_balance.position.magnitude() {
            return reject("account is undercollateralized and absolute position size increased");
        }
        if !current_balance.position.is_zero()
            && current_balance.position.is_positive() != initial_balance.position.is_positive()
        {
            return reject("account is undercollateralized and position changed signs");
        }
        if initial_neg.is_zero() {
            return reject("account is undercollateralized and was not previously");
        }
        if &current_pos * &initial_neg < &initial_pos * &current_neg {
            return reject("account is undercollateralized and collateralization decreased");
        }
    }

    Ok(())
}
