use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::cmp;
use crate::error::{Error, Result};
use crate::interfaces::trader::{TradeRequest, TradeResult, Trader, TRADER_FLAG_LIQUIDATION};
use crate::settlement::collateral::is_undercollateralized;
use crate::types::balance::Balance;
use crate::types::fixed::{multiply_fraction, multiply_fraction_round_up};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationArgs {
    pub amount: BigUint,
    /// Taker side; must close the maker's position, never grow it.
    pub is_buy: bool,
    pub all_or_nothing: bool,
}

/// Share of the maker's margin that moves with `amount` of its position.
///
/// Keeps the maker's margin/position ratio, so a partial close never lowers
/// its collateralization.
pub fn margin_share(maker: &Balance, amount: &BigUint, is_buy: bool) -> Result<BigUint> {
    let margin = maker.margin.magnitude();
    let position = maker.position.magnitude();
    if is_buy {
        multiply_fraction_round_up(margin, amount, position)
    } else {
        multiply_fraction(margin, amount, position)
    }
}

/// Lets a taker absorb an undercollateralized maker's position together
/// with a proportional slice of its margin.
#[derive(Clone, Copy, Debug, Default)]
pub struct Liquidation;

impl Liquidation {
    fn validate(&self, request: &TradeRequest<'_>, args: &LiquidationArgs) -> Result<()> {
        if !request.sender_can_act_for_taker {
            return Err(Error::MissingAccountPermissions {
                sender: request.sender,
                account: request.taker,
            });
        }

        let maker = request.maker_balance;
        if !is_undercollateralized(maker, request.price, request.min_collateral) {
            return Err(Error::LiquidationRejected("maker is not undercollateralized"));
        }
        if maker.position.is_zero() {
            return Err(Error::LiquidationRejected("maker has no position"));
        }
        if args.all_or_nothing && maker.position.magnitude() < &args.amount {
            return Err(Error::LiquidationRejected("allOrNothing is set and maker position is less than amount"));
        }
        if args.is_buy != maker.position.is_positive() {
            return Err(Error::LiquidationRejected("liquidation must not increase maker's position size"));
        }
        if maker.margin.is_negative() && maker.position.is_negative() {
            return Err(Error::LiquidationRejected("maker position and margin are both negative"));
        }
        Ok(())
    }
}

impl Trader for Liquidation {
    type Args = LiquidationArgs;

    fn trade(&mut self, request: &TradeRequest<'_>, args: &LiquidationArgs) -> Result<TradeResult> {
        self.validate(request, args)?;

        let maker = request.maker_balance;
        let amount = cmp::min(args.amount.clone(), maker.position.magnitude().clone());
        let margin_amount = margin_share(maker, &amount, args.is_buy)?;

        tracing::info!(
            maker = %request.maker,
            taker = %request.taker,
            amount = %amount,
            margin = %margin_amount,
            is_buy = args.is_buy,
            "Liquidating undercollateralized account"
        );

        Ok(TradeResult {
            margin_amount,
            position_amount: amount,
            is_buy: args.is_buy,
            trader_flags: TRADER_FLAG_LIQUIDATION,
        })
    }
}
