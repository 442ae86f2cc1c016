use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp;
use crate::core::perpetual::Perpetual;
use crate::core::state::{FinalSettlement, Transaction};
use crate::error::{Error, Result};
use crate::events::admin::AdminEvent;
use crate::events::balance::{BalanceUpdate, BalanceUpdateType};
use crate::events::Event;
use crate::interfaces::funder::Funder;
use crate::interfaces::price_oracle::PriceOracle;
use crate::observability::tracing::trace_operation;
use crate::settlement::funding_index::Context;
use crate::types::balance::Balance;
use crate::types::fixed::base;
use crate::types::ids::AccountId;
use crate::types::price::Price;
use crate::types::signed::SignedValue;

impl<O: PriceOracle, F: Funder> Perpetual<O, F> {
    /// Freeze price and index for an orderly wind-down. Trading, margin
    /// changes and settlement stop; accounts can only cash out.
    pub fn enable_final_settlement(
        &mut self,
        sender: AccountId,
        price_lower_bound: Price,
        price_upper_bound: Price,
    ) -> Result<FinalSettlement> {
        let _span = trace_operation("enable_final_settlement", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_enable_final_settlement(&mut tx, &sender, &price_lower_bound, &price_upper_bound);
        self.finish("enable_final_settlement", tx, result)
    }

    fn apply_enable_final_settlement(
        &self,
        tx: &mut Transaction,
        sender: &AccountId,
        lower: &Price,
        upper: &Price,
    ) -> Result<FinalSettlement> {
        self.require_admin(sender)?;
        let context = self.load_context(tx)?;
        if &context.price < lower || &context.price > upper {
            return Err(Error::InvalidParameter(format!(
                "oracle price {} is outside final settlement bounds [{}, {}]",
                context.price, lower, upper
            )));
        }

        let frozen = FinalSettlement {
            price: context.price,
            index: context.index,
        };
        tx.state.final_settlement = Some(frozen.clone());

        tracing::info!(price = %frozen.price, index = %frozen.index, "Final settlement enabled");
        tx.emit(Event::Admin(AdminEvent::FinalSettlementEnabled {
            price: frozen.price.clone(),
            index: frozen.index.clone(),
        }));
        Ok(frozen)
    }

    /// Pay out the sender's account value at the frozen price, as far as the
    /// vault allows. Any shortfall stays on the account as positive margin.
    /// An account with no value is left as it is, debt included.
    pub fn withdraw_final_settlement(&mut self, sender: AccountId) -> Result<BigUint> {
        let _span = trace_operation("withdraw_final_settlement", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_withdraw_final_settlement(&mut tx, sender);
        self.finish("withdraw_final_settlement", tx, result)
    }

    fn apply_withdraw_final_settlement(&self, tx: &mut Transaction, account: AccountId) -> Result<BigUint> {
        let frozen = tx.state.final_settlement.clone().ok_or(Error::FinalSettlementNotEnabled)?;
        let context = Context {
            price: frozen.price,
            min_collateral: tx.state.min_collateral.clone(),
            index: frozen.index,
        };

        let balance = self.settle(tx, &context, account)?;
        let value = account_value(&balance, &context.price);
        if value.is_zero() && !balance.is_empty() {
            tracing::info!(account = %account, balance = %balance, "Nothing to pay out; balance kept");
            return Ok(value);
        }

        let amount = cmp::min(value.clone(), tx.state.vault_balance.clone());
        tx.state.vault_balance -= &amount;

        let remaining = Balance::new(SignedValue::positive(value - &amount), SignedValue::zero());
        tx.set_balance(account, remaining.clone());

        tracing::info!(account = %account, amount = %amount, remaining = %remaining, "Final settlement withdrawn");
        tx.emit(Event::BalanceUpdate(BalanceUpdate {
            account,
            counterparty: account,
            update_type: BalanceUpdateType::FinalSettlement,
            amount: amount.clone(),
            balance: remaining,
        }));
        Ok(amount)
    }
}

/// Net worth in 18-decimal margin units; zero when liabilities win.
fn account_value(balance: &Balance, price: &Price) -> BigUint {
    let (positive, negative) = balance.get_positive_and_negative_value(price);
    if positive <= negative {
        return BigUint::default();
    }
    (positive - negative) / base()
}
