use im::HashMap;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::cmp;
use crate::config::DeleveragingConfig;
use crate::error::{Error, Result};
use crate::interfaces::trader::{TradeRequest, TradeResult, Trader, TRADER_FLAG_DELEVERAGING};
use crate::liquidation::liquidator::margin_share;
use crate::settlement::collateral::is_underwater;
use crate::types::balance::Balance;
use crate::types::ids::AccountId;
use crate::types::price::Price;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleveragingArgs {
    pub amount: BigUint,
    pub is_buy: bool,
    pub all_or_nothing: bool,
}

/// Closes an underwater maker against an opposite-signed taker.
///
/// Anyone may deleverage a maker that has been marked for at least the
/// timelock; the configured operator may do so at any time.
#[derive(Clone, Debug)]
pub struct Deleveraging {
    config: DeleveragingConfig,
    marks: HashMap<AccountId, u64>,
}

impl Deleveraging {
    pub fn new(config: DeleveragingConfig) -> Self {
        Deleveraging {
            config,
            marks: HashMap::new(),
        }
    }

    pub fn with_marks(config: DeleveragingConfig, marks: impl IntoIterator<Item = (AccountId, u64)>) -> Self {
        Deleveraging {
            config,
            marks: marks.into_iter().collect(),
        }
    }

    pub fn config(&self) -> &DeleveragingConfig {
        &self.config
    }

    pub fn marked_at(&self, account: &AccountId) -> Option<u64> {
        self.marks.get(account).copied()
    }

    pub fn marks(&self) -> impl Iterator<Item = (&AccountId, &u64)> {
        self.marks.iter()
    }

    /// Start the timelock on an underwater account. Re-marking restarts it.
    pub fn mark(&mut self, account: AccountId, balance: &Balance, price: &Price, now: u64) -> Result<()> {
        if !is_underwater(balance, price) {
            return Err(Error::DeleveragingRejected("cannot mark since account is not underwater"));
        }
        self.marks.insert(account, now);
        Ok(())
    }

    pub fn unmark(&mut self, account: AccountId, balance: &Balance, price: &Price) -> Result<()> {
        if is_underwater(balance, price) {
            return Err(Error::DeleveragingRejected("cannot unmark since account is underwater"));
        }
        self.marks.remove(&account);
        Ok(())
    }

    fn verify_permissions(&self, request: &TradeRequest<'_>) -> Result<()> {
        if request.sender == self.config.operator {
            return Ok(());
        }

        let marked_at = self
            .marked_at(&request.maker)
            .ok_or(Error::DeleveragingRejected("cannot deleverage since account is not marked"))?;
        if request.now.saturating_sub(marked_at) < self.config.timelock_seconds {
            return Err(Error::DeleveragingRejected(
                "cannot deleverage since account has not been marked for the timelock period",
            ));
        }

        if !request.sender_can_act_for_taker {
            return Err(Error::MissingAccountPermissions {
                sender: request.sender,
                account: request.taker,
            });
        }
        Ok(())
    }

    fn verify_trade(&self, request: &TradeRequest<'_>, args: &DeleveragingArgs) -> Result<()> {
        let maker = request.maker_balance;
        let taker = request.taker_balance;

        if !is_underwater(maker, request.price) {
            return Err(Error::DeleveragingRejected("cannot deleverage since maker is not underwater"));
        }
        if maker.position.is_zero() {
            return Err(Error::DeleveragingRejected("maker has no position"));
        }
        if args.all_or_nothing && maker.position.magnitude() != &args.amount {
            return Err(Error::DeleveragingRejected("allOrNothing is set and maker position is not equal to amount"));
        }
        if args.is_buy != maker.position.is_positive() {
            return Err(Error::DeleveragingRejected("deleveraging must not increase maker's position size"));
        }
        if maker.margin.is_negative() && maker.position.is_negative() {
            return Err(Error::DeleveragingRejected("maker position and margin are both negative"));
        }
        if taker.position.is_zero() || taker.position.is_positive() == maker.position.is_positive() {
            return Err(Error::DeleveragingRejected("taker position has wrong sign to deleverage this maker"));
        }
        if args.all_or_nothing && taker.position.magnitude() < &args.amount {
            return Err(Error::DeleveragingRejected("allOrNothing is set and taker position is less than amount"));
        }
        Ok(())
    }
}

impl Trader for Deleveraging {
    type Args = DeleveragingArgs;

    fn trade(&mut self, request: &TradeRequest<'_>, args: &DeleveragingArgs) -> Result<TradeResult> {
        if request.trader_flags != 0 {
            return Err(Error::DeleveragingRejected(
                "cannot deleverage after other trades in the same call",
            ));
        }
        self.verify_permissions(request)?;
        self.verify_trade(request, args)?;

        let maker = request.maker_balance;
        let amount = cmp::min(
            args.amount.clone(),
            cmp::min(maker.position.magnitude(), request.taker_balance.position.magnitude()).clone(),
        );
        let margin_amount = margin_share(maker, &amount, args.is_buy)?;

        if &amount == maker.position.magnitude() && self.marks.remove(&request.maker).is_some() {
            tracing::debug!(account = %request.maker, "Deleveraging mark cleared by full close");
        }

        tracing::info!(
            maker = %request.maker,
            taker = %request.taker,
            amount = %amount,
            margin = %margin_amount,
            is_buy = args.is_buy,
            "Deleveraging underwater account"
        );

        Ok(TradeResult {
            margin_amount,
            position_amount: amount,
            is_buy: args.is_buy,
            trader_flags: TRADER_FLAG_DELEVERAGING,
        })
    }
}
