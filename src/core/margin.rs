use num_bigint::BigUint;
use num_traits::Zero;
use crate::core::perpetual::Perpetual;
use crate::core::state::Transaction;
use crate::error::{Error, Result};
use crate::events::balance::{BalanceUpdate, BalanceUpdateType};
use crate::events::Event;
use crate::interfaces::funder::Funder;
use crate::interfaces::price_oracle::PriceOracle;
use crate::observability::tracing::trace_operation;
use crate::settlement::collateral::is_collateralized;
use crate::types::balance::Balance;
use crate::types::ids::AccountId;

impl<O: PriceOracle, F: Funder> Perpetual<O, F> {
    /// Credit `amount` of margin to `account`. Anyone may deposit to any account.
    pub fn deposit(&mut self, sender: AccountId, account: AccountId, amount: BigUint) -> Result<Balance> {
        let _span = trace_operation("deposit", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_deposit(&mut tx, sender, account, amount);
        self.finish("deposit", tx, result)
    }

    fn apply_deposit(&self, tx: &mut Transaction, sender: AccountId, account: AccountId, amount: BigUint) -> Result<Balance> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let context = self.load_context(tx)?;
        let mut balance = self.settle(tx, &context, account)?;
        balance.add_to_margin(&amount);
        tx.set_balance(account, balance.clone());
        tx.state.vault_balance += &amount;

        tracing::info!(account = %account, amount = %amount, balance = %balance, "Margin deposited");
        tx.emit(Event::BalanceUpdate(BalanceUpdate {
            account,
            counterparty: sender,
            update_type: BalanceUpdateType::Deposit,
            amount,
            balance: balance.clone(),
        }));
        Ok(balance)
    }

    /// Debit `amount` of margin from `account` and pay it to `destination`.
    /// The account must stay collateralized.
    pub fn withdraw(
        &mut self,
        sender: AccountId,
        account: AccountId,
        destination: AccountId,
        amount: BigUint,
    ) -> Result<Balance> {
        let _span = trace_operation("withdraw", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_withdraw(&mut tx, sender, account, destination, amount);
        self.finish("withdraw", tx, result)
    }

    fn apply_withdraw(
        &self,
        tx: &mut Transaction,
        sender: AccountId,
        account: AccountId,
        destination: AccountId,
        amount: BigUint,
    ) -> Result<Balance> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        if !tx.state.has_account_permissions(&account, &sender) {
            return Err(Error::MissingAccountPermissions { sender, account });
        }

        let context = self.load_context(tx)?;
        let mut balance = self.settle(tx, &context, account)?;
        balance.sub_from_margin(&amount);
        tx.set_balance(account, balance.clone());

        if tx.state.vault_balance < amount {
            return Err(Error::InsufficientVaultBalance {
                required: amount.to_string(),
                available: tx.state.vault_balance.to_string(),
            });
        }
        tx.state.vault_balance -= &amount;

        if !is_collateralized(&balance, &context.price, &context.min_collateral) {
            return Err(Error::Undercollateralized {
                account,
                reason: "account not collateralized after withdrawal",
            });
        }

        tracing::info!(
            account = %account,
            destination = %destination,
            amount = %amount,
            balance = %balance,
            "Margin withdrawn"
        );
        tx.emit(Event::BalanceUpdate(BalanceUpdate {
            account,
            counterparty: destination,
            update_type: BalanceUpdateType::Withdrawal,
            amount,
            balance: balance.clone(),
        }));
        Ok(balance)
    }
}
