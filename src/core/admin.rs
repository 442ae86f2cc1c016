use num_bigint::BigUint;
use std::sync::Arc;
use crate::config::{EngineConfig, FundingConfig};
use crate::core::perpetual::Perpetual;
use crate::core::state::Transaction;
use crate::error::{Error, Result};
use crate::events::admin::AdminEvent;
use crate::events::funding::FundingRateUpdated;
use crate::events::Event;
use crate::funding::FundingOracle;
use crate::interfaces::clock::Clock;
use crate::interfaces::funder::Funder;
use crate::interfaces::price_oracle::PriceOracle;
use crate::observability::tracing::trace_operation;
use crate::storage::layout::encode_index;
use crate::storage::Snapshot;
use crate::types::fixed::{base, format_decimal, DECIMALS};
use crate::types::ids::AccountId;
use crate::types::index::FundingRate;
use crate::types::signed::SignedValue;

impl<O: PriceOracle, F: Funder> Perpetual<O, F> {
    pub(super) fn require_admin(&self, sender: &AccountId) -> Result<()> {
        if *sender != self.config.risk.admin {
            return Err(Error::Unauthorized(format!("{} is not the admin", sender)));
        }
        Ok(())
    }

    pub fn set_global_operator(&mut self, sender: AccountId, operator: AccountId, approved: bool) -> Result<()> {
        let _span = trace_operation("set_global_operator", &sender).entered();
        let mut tx = self.begin();
        let result = self.require_admin(&sender).map(|_| {
            if approved {
                tx.state.global_operators.insert(operator);
            } else {
                tx.state.global_operators.remove(&operator);
            }
            tracing::info!(operator = %operator, approved, "Global operator set");
            tx.emit(Event::Admin(AdminEvent::GlobalOperatorSet { operator, approved }));
        });
        self.finish("set_global_operator", tx, result)
    }

    /// Let `operator` act for the sender's own account.
    pub fn set_local_operator(&mut self, sender: AccountId, operator: AccountId, approved: bool) -> Result<()> {
        let _span = trace_operation("set_local_operator", &sender).entered();
        let mut tx = self.begin();
        if approved {
            tx.state.local_operators.insert((sender, operator));
        } else {
            tx.state.local_operators.remove(&(sender, operator));
        }
        tracing::info!(account = %sender, operator = %operator, approved, "Local operator set");
        tx.emit(Event::Admin(AdminEvent::LocalOperatorSet {
            account: sender,
            operator,
            approved,
        }));
        self.finish("set_local_operator", tx, Ok(()))
    }

    /// Ratios below 1.0 would let accounts hold less than their liabilities.
    pub fn set_min_collateral(&mut self, sender: AccountId, min_collateral: BigUint) -> Result<()> {
        let _span = trace_operation("set_min_collateral", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_min_collateral(&mut tx, &sender, min_collateral);
        self.finish("set_min_collateral", tx, result)
    }

    fn apply_min_collateral(&self, tx: &mut Transaction, sender: &AccountId, min_collateral: BigUint) -> Result<()> {
        self.require_admin(sender)?;
        if min_collateral < base() {
            return Err(Error::InvalidParameter(format!(
                "min collateral {} is below 1.0",
                format_decimal(&min_collateral, DECIMALS)
            )));
        }

        tracing::info!(min_collateral = %format_decimal(&min_collateral, DECIMALS), "Min collateral set");
        tx.state.min_collateral = min_collateral.clone();
        tx.emit(Event::Admin(AdminEvent::MinCollateralSet { min_collateral }));
        Ok(())
    }

    /// Replace the price source. The new source must report a non-zero price.
    pub fn set_oracle(&mut self, sender: AccountId, oracle: O) -> Result<()> {
        let _span = trace_operation("set_oracle", &sender).entered();
        let mut tx = self.begin();
        let result = self.require_admin(&sender)
            .and_then(|_| oracle.get_price())
            .and_then(|price| {
                if price.is_zero() {
                    return Err(Error::InvalidParameter("new oracle reports a zero price".to_string()));
                }
                tracing::info!(price = %price, "Oracle replaced");
                tx.emit(Event::Admin(AdminEvent::OracleSet { price }));
                Ok(())
            });
        self.finish("set_oracle", tx, result)?;
        self.oracle = oracle;
        Ok(())
    }
}

impl<O: PriceOracle> Perpetual<O, FundingOracle> {
    /// `restore` with the funding oracle rebuilt from the snapshot's stored
    /// rate. A snapshot without one starts at a zero rate as of its capture.
    pub fn restore_with_funding(
        config: EngineConfig,
        funding: FundingConfig,
        oracle: O,
        clock: Arc<dyn Clock>,
        snapshot: &Snapshot,
    ) -> Result<Self> {
        let funder = match snapshot.funding_rate()? {
            Some(rate) => FundingOracle::with_rate(funding, rate),
            None => FundingOracle::new(funding, snapshot.timestamp),
        };
        Perpetual::restore(config, oracle, funder, clock, snapshot)
    }

    pub fn get_funding_rate(&self) -> &FundingRate {
        self.funder.current_rate()
    }

    /// Publish a new per-second funding rate, clamped to the configured
    /// bounds. Takes effect from the last index update, not from now.
    pub fn set_funding_rate(&mut self, sender: AccountId, new_rate: SignedValue) -> Result<FundingRate> {
        let _span = trace_operation("set_funding_rate", &sender).entered();
        let mut tx = self.begin();
        let mut funder = self.funder.clone();
        let result = funder.set_funding_rate(sender, new_rate.clone(), tx.now).and_then(|rate| {
            encode_index(&rate)?;
            tx.emit(Event::FundingRateUpdated(FundingRateUpdated {
                rate: rate.clone(),
                requested: new_rate,
            }));
            Ok(rate)
        });
        let rate = self.finish("set_funding_rate", tx, result)?;
        self.funder = funder;
        Ok(rate)
    }
}
