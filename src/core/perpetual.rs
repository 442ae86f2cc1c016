use num_bigint::BigUint;
use std::sync::Arc;
use crate::config::EngineConfig;
use crate::core::state::{AccountState, FinalSettlement, PerpetualState, Transaction};
use crate::error::{Error, Result};
use crate::events::balance::AccountSettled;
use crate::events::funding::IndexUpdated;
use crate::events::{Event, EventLog, EventRecord};
use crate::interfaces::clock::Clock;
use crate::interfaces::funder::Funder;
use crate::interfaces::price_oracle::PriceOracle;
use crate::invariants::InvariantChecks;
use crate::matching::OrderStatus;
use crate::observability::metrics::{record_committed, record_rejected};
use crate::observability::tracing::trace_settlement;
use crate::settlement::funding_index::{refresh_index, Context};
use crate::settlement::settle::{settle_account, SettleOutcome};
use crate::storage::Snapshot;
use crate::types::balance::Balance;
use crate::types::fixed::{format_decimal, DECIMALS};
use crate::types::ids::{AccountId, OrderHash};
use crate::types::index::Index;

/// Margin accounting for a single perpetual market.
///
/// Owns the only copy of the state. Each public mutating call runs against a
/// cloned [`Transaction`] and is committed whole or not at all.
pub struct Perpetual<O: PriceOracle, F: Funder> {
    pub(super) config: EngineConfig,
    pub(super) oracle: O,
    pub(super) funder: F,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) state: PerpetualState,
    pub(super) events: EventLog,
}

impl<O: PriceOracle, F: Funder> Perpetual<O, F> {
    pub fn new(config: EngineConfig, oracle: O, funder: F, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let state = PerpetualState::new(&config, now);
        tracing::info!(
            now,
            min_collateral = %format_decimal(&state.min_collateral, DECIMALS),
            "Perpetual initialized"
        );

        Perpetual {
            config,
            oracle,
            funder,
            clock,
            state,
            events: EventLog::new(),
        }
    }

    /// Resume from a verified snapshot. Event numbering continues where the
    /// snapshot left off.
    pub fn restore(
        config: EngineConfig,
        oracle: O,
        funder: F,
        clock: Arc<dyn Clock>,
        snapshot: &Snapshot,
    ) -> Result<Self> {
        let state = snapshot.restore(&config)?;
        tracing::info!(
            sequence = snapshot.sequence,
            accounts = state.accounts.len(),
            "Perpetual restored from snapshot"
        );

        Ok(Perpetual {
            config,
            oracle,
            funder,
            clock,
            state,
            events: EventLog::starting_at(snapshot.sequence),
        })
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::capture(
            &self.state,
            self.funder.funding_rate(),
            self.events.next_sequence(),
            self.clock.now(),
        )
    }

    // Getters

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn funder(&self) -> &F {
        &self.funder
    }

    pub fn state(&self) -> &PerpetualState {
        &self.state
    }

    /// Stored balance; funding accrued since the last touch is not applied.
    pub fn get_account_balance(&self, account: &AccountId) -> Balance {
        self.state.account(account).balance
    }

    pub fn get_account_index(&self, account: &AccountId) -> Index {
        self.state.account(account).local_index
    }

    pub fn get_global_index(&self) -> &Index {
        &self.state.global_index
    }

    pub fn get_min_collateral(&self) -> &BigUint {
        &self.state.min_collateral
    }

    pub fn get_vault_balance(&self) -> &BigUint {
        &self.state.vault_balance
    }

    pub fn get_is_global_operator(&self, operator: &AccountId) -> bool {
        self.state.global_operators.contains(operator)
    }

    pub fn get_is_local_operator(&self, account: &AccountId, operator: &AccountId) -> bool {
        self.state.local_operators.contains(&(*account, *operator))
    }

    pub fn has_account_permissions(&self, account: &AccountId, operator: &AccountId) -> bool {
        self.state.has_account_permissions(account, operator)
    }

    pub fn get_final_settlement(&self) -> Option<&FinalSettlement> {
        self.state.final_settlement.as_ref()
    }

    pub fn get_final_settlement_enabled(&self) -> bool {
        self.state.final_settlement.is_some()
    }

    pub fn get_order_status(&self, hash: &OrderHash) -> OrderStatus {
        self.state.orders.status(hash)
    }

    pub fn get_order_filled_amount(&self, hash: &OrderHash) -> BigUint {
        self.state.orders.filled_amount(hash)
    }

    pub fn get_deleveraging_mark(&self, account: &AccountId) -> Option<u64> {
        self.state.deleveraging.marked_at(account)
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    /// Refresh the index and settle each listed account.
    pub fn settle_accounts(&mut self, accounts: &[AccountId]) -> Result<Vec<Balance>> {
        let _span = tracing::info_span!("operation", operation = "settle_accounts").entered();
        let mut tx = self.begin();
        let result = self.apply_settle_accounts(&mut tx, accounts);
        self.finish("settle_accounts", tx, result)
    }

    fn apply_settle_accounts(&self, tx: &mut Transaction, accounts: &[AccountId]) -> Result<Vec<Balance>> {
        let context = self.load_context(tx)?;
        accounts
            .iter()
            .map(|account| self.settle(tx, &context, *account))
            .collect()
    }

    pub(super) fn begin(&self) -> Transaction {
        Transaction::new(self.state.clone(), self.clock.now())
    }

    /// Commit `tx` if the operation succeeded and every written record fits
    /// its storage width; otherwise drop it.
    pub(super) fn finish<T>(&mut self, operation: &'static str, tx: Transaction, result: Result<T>) -> Result<T> {
        let value = match result.and_then(|value| tx.validate_storage().map(|_| value)) {
            Ok(value) => value,
            Err(e) => return Err(self.reject(operation, e)),
        };

        let now = tx.now;
        let (state, events) = tx.into_parts();
        record_committed(operation, &events);
        if let Err(e) = self.events.append(now, events) {
            return Err(self.reject(operation, e));
        }
        self.state = state;

        if cfg!(debug_assertions) {
            if let Err(e) = InvariantChecks::check_all(&self.state, self.clock.now()) {
                tracing::error!(operation, error = %e, "Invariant check failed after commit");
            }
        }

        Ok(value)
    }

    fn reject(&self, operation: &'static str, error: Error) -> Error {
        tracing::warn!(operation, error = %error, "Operation rejected");
        record_rejected(operation, &error);
        error
    }

    /// Read the price, advance the global index to now and return the
    /// context every account in this operation is settled against.
    pub(super) fn load_context(&self, tx: &mut Transaction) -> Result<Context> {
        if tx.state.final_settlement.is_some() {
            return Err(Error::FinalSettlementEnabled);
        }

        let price = self.oracle.get_price()?;
        let index = refresh_index(&tx.state.global_index, tx.now, &price, &self.funder)?;
        if index != tx.state.global_index {
            tx.state.global_index = index.clone();
            tx.emit(Event::IndexUpdated(IndexUpdated { index: index.clone() }));
        }

        Ok(Context {
            price,
            min_collateral: tx.state.min_collateral.clone(),
            index,
        })
    }

    /// Bring one account current with `context.index` and return its balance.
    pub(super) fn settle(&self, tx: &mut Transaction, context: &Context, account: AccountId) -> Result<Balance> {
        let _span = trace_settlement(&account).entered();
        let current = tx.account(&account);
        let (balance, outcome) = settle_account(&current.balance, &current.local_index, &context.index)?;

        if outcome.advances_index() {
            if let SettleOutcome::Settled { is_credit, amount } = outcome {
                tracing::debug!(is_credit, amount = %amount, balance = %balance, "Account settled");
                tx.emit(Event::AccountSettled(AccountSettled {
                    account,
                    is_credit,
                    amount,
                    balance: balance.clone(),
                }));
            }
            tx.set_account(account, AccountState {
                balance: balance.clone(),
                local_index: context.index.clone(),
            });
        }

        Ok(balance)
    }
}
