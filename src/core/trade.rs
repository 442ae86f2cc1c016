use serde::{Deserialize, Serialize};
use crate::core::perpetual::Perpetual;
use crate::core::state::Transaction;
use crate::error::{Error, Result};
use crate::events::liquidation::{Deleveraged, DeleveragingMark, Liquidated};
use crate::events::order::OrderFilled;
use crate::events::trade::TradeEvent;
use crate::events::Event;
use crate::interfaces::funder::Funder;
use crate::interfaces::price_oracle::PriceOracle;
use crate::interfaces::trader::{TradeRequest, TradeResult, Trader, TraderKind};
use crate::liquidation::{DeleveragingArgs, LiquidationArgs};
use crate::matching::OrderArgs;
use crate::observability::tracing::trace_operation;
use crate::settlement::collateral::verify_final_balances;
use crate::settlement::funding_index::Context;
use crate::types::balance::Balance;
use crate::types::ids::AccountId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Fill(OrderArgs),
    Liquidate(LiquidationArgs),
    Deleverage(DeleveragingArgs),
}

impl TradeAction {
    pub fn kind(&self) -> TraderKind {
        match self {
            TradeAction::Fill(_) => TraderKind::Orders,
            TradeAction::Liquidate(_) => TraderKind::Liquidation,
            TradeAction::Deleverage(_) => TraderKind::Deleveraging,
        }
    }

    /// Liquidation and deleveraging targets skip the post-trade collateral check.
    fn exempts_maker(&self) -> bool {
        !matches!(self, TradeAction::Fill(_))
    }
}

/// One exchange between two entries of the `accounts` list passed to `trade`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeArg {
    pub maker_index: usize,
    pub taker_index: usize,
    pub action: TradeAction,
}

/// Move `result` between maker and taker. The maker's deltas are the exact
/// negation of the taker's.
fn apply_result(maker: &mut Balance, taker: &mut Balance, result: &TradeResult) {
    if result.is_buy {
        maker.add_to_margin(&result.margin_amount);
        maker.sub_from_position(&result.position_amount);
        taker.sub_from_margin(&result.margin_amount);
        taker.add_to_position(&result.position_amount);
    } else {
        maker.sub_from_margin(&result.margin_amount);
        maker.add_to_position(&result.position_amount);
        taker.add_to_margin(&result.margin_amount);
        taker.sub_from_position(&result.position_amount);
    }
}

impl<O: PriceOracle, F: Funder> Perpetual<O, F> {
    /// Settle every account, run each trade argument through its trader and
    /// verify the final balances. `accounts` must be sorted and unique.
    pub fn trade(&mut self, sender: AccountId, accounts: &[AccountId], trade_args: &[TradeArg]) -> Result<Vec<Balance>> {
        let _span = trace_operation("trade", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_trade(&mut tx, sender, accounts, trade_args);
        self.finish("trade", tx, result)
    }

    fn apply_trade(
        &self,
        tx: &mut Transaction,
        sender: AccountId,
        accounts: &[AccountId],
        trade_args: &[TradeArg],
    ) -> Result<Vec<Balance>> {
        if accounts.is_empty() || accounts.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidAccounts);
        }

        let context = self.load_context(tx)?;
        let initial = accounts
            .iter()
            .map(|account| self.settle(tx, &context, *account))
            .collect::<Result<Vec<_>>>()?;

        let mut current = initial.clone();
        let mut exempt = vec![false; accounts.len()];
        let mut checked = vec![false; accounts.len()];
        let mut trader_flags = 0u32;

        for arg in trade_args {
            for index in [arg.maker_index, arg.taker_index] {
                if index >= accounts.len() {
                    return Err(Error::AccountIndexOutOfRange { index, len: accounts.len() });
                }
            }
            let maker = accounts[arg.maker_index];
            let taker = accounts[arg.taker_index];
            let had_mark = tx.state.deleveraging.marked_at(&maker).is_some();

            let request = TradeRequest {
                sender,
                maker,
                taker,
                price: &context.price,
                min_collateral: &context.min_collateral,
                now: tx.now,
                maker_balance: &current[arg.maker_index],
                taker_balance: &current[arg.taker_index],
                trader_flags,
                sender_can_act_for_taker: tx.state.has_account_permissions(&taker, &sender),
            };
            let result = match &arg.action {
                TradeAction::Fill(args) => tx.state.orders.trade(&request, args),
                TradeAction::Liquidate(args) => tx.state.liquidation.trade(&request, args),
                TradeAction::Deleverage(args) => tx.state.deleveraging.trade(&request, args),
            }?;
            trader_flags |= result.trader_flags;

            self.emit_trader_events(tx, &context, arg, maker, taker, &result, had_mark);

            if maker == taker {
                continue;
            }

            let mut maker_balance = current[arg.maker_index].clone();
            let mut taker_balance = current[arg.taker_index].clone();
            apply_result(&mut maker_balance, &mut taker_balance, &result);
            current[arg.maker_index] = maker_balance.clone();
            current[arg.taker_index] = taker_balance.clone();
            // Exemption covers a liquidated or deleveraged maker only; any
            // other role in the same call puts the account back under check.
            if arg.action.exempts_maker() {
                exempt[arg.maker_index] = true;
            } else {
                checked[arg.maker_index] = true;
            }
            checked[arg.taker_index] = true;

            tx.emit(Event::Trade(TradeEvent {
                maker,
                taker,
                trader: arg.action.kind(),
                margin_amount: result.margin_amount,
                position_amount: result.position_amount,
                is_buy: result.is_buy,
                maker_balance,
                taker_balance,
            }));
        }

        for (account, balance) in accounts.iter().zip(&current) {
            tx.set_balance(*account, balance.clone());
        }

        let exempt: Vec<bool> = exempt.iter().zip(&checked).map(|(e, c)| *e && !*c).collect();
        verify_final_balances(&context, accounts, &initial, &current, &exempt)?;

        tracing::info!(
            accounts = accounts.len(),
            trades = trade_args.len(),
            trader_flags,
            "Trade committed"
        );
        Ok(current)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_trader_events(
        &self,
        tx: &mut Transaction,
        context: &Context,
        arg: &TradeArg,
        maker: AccountId,
        taker: AccountId,
        result: &TradeResult,
        had_mark: bool,
    ) {
        match &arg.action {
            TradeAction::Fill(args) => {
                let hash = args.order.hash();
                tx.emit(Event::OrderFilled(OrderFilled {
                    hash,
                    amount: args.fill.amount.clone(),
                    price: args.fill.price.clone(),
                    fee: args.fill.fee.clone(),
                    total_filled: tx.state.orders.filled_amount(&hash),
                }));
            }
            TradeAction::Liquidate(_) => {
                tx.emit(Event::Liquidated(Liquidated {
                    maker,
                    taker,
                    amount: result.position_amount.clone(),
                    is_buy: result.is_buy,
                    price: context.price.clone(),
                }));
            }
            TradeAction::Deleverage(_) => {
                if had_mark && tx.state.deleveraging.marked_at(&maker).is_none() {
                    tx.emit(Event::DeleveragingMark(DeleveragingMark { account: maker, marked: false }));
                }
                tx.emit(Event::Deleveraged(Deleveraged {
                    maker,
                    taker,
                    amount: result.position_amount.clone(),
                    is_buy: result.is_buy,
                    price: context.price.clone(),
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_apply_result_is_zero_sum() {
        let mut maker = Balance::from_i128(100, 5);
        let mut taker = Balance::from_i128(-40, -2);
        let result = TradeResult {
            margin_amount: BigUint::from(30u32),
            position_amount: BigUint::from(3u32),
            is_buy: true,
            trader_flags: 0,
        };
        apply_result(&mut maker, &mut taker, &result);
        assert_eq!(maker, Balance::from_i128(130, 2));
        assert_eq!(taker, Balance::from_i128(-70, 1));

        let result = TradeResult { is_buy: false, ..result };
        apply_result(&mut maker, &mut taker, &result);
        assert_eq!(maker, Balance::from_i128(100, 5));
        assert_eq!(taker, Balance::from_i128(-40, -2));
    }

    #[test]
    fn test_action_kinds() {
        let liquidate = TradeAction::Liquidate(LiquidationArgs {
            amount: BigUint::from(1u32),
            is_buy: true,
            all_or_nothing: false,
        });
        assert_eq!(liquidate.kind(), TraderKind::Liquidation);
        assert!(liquidate.exempts_maker());
    }
}
