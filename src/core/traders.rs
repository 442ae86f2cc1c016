use crate::core::perpetual::Perpetual;
use crate::core::state::Transaction;
use crate::error::Result;
use crate::events::liquidation::DeleveragingMark;
use crate::events::order::{OrderStatusChange, OrderStatusUpdate};
use crate::events::Event;
use crate::interfaces::funder::Funder;
use crate::interfaces::price_oracle::PriceOracle;
use crate::matching::Order;
use crate::observability::tracing::trace_operation;
use crate::types::ids::{AccountId, OrderHash};

impl<O: PriceOracle, F: Funder> Perpetual<O, F> {
    /// Start the deleveraging timelock on an underwater account. Anyone may call.
    pub fn mark_for_deleveraging(&mut self, sender: AccountId, account: AccountId) -> Result<()> {
        let _span = trace_operation("mark_for_deleveraging", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_mark(&mut tx, account, true);
        self.finish("mark_for_deleveraging", tx, result)
    }

    pub fn unmark_for_deleveraging(&mut self, sender: AccountId, account: AccountId) -> Result<()> {
        let _span = trace_operation("unmark_for_deleveraging", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_mark(&mut tx, account, false);
        self.finish("unmark_for_deleveraging", tx, result)
    }

    fn apply_mark(&self, tx: &mut Transaction, account: AccountId, marked: bool) -> Result<()> {
        let context = self.load_context(tx)?;
        let balance = self.settle(tx, &context, account)?;
        if marked {
            tx.state.deleveraging.mark(account, &balance, &context.price, tx.now)?;
        } else {
            tx.state.deleveraging.unmark(account, &balance, &context.price)?;
        }

        tracing::info!(account = %account, marked, "Deleveraging mark updated");
        tx.emit(Event::DeleveragingMark(DeleveragingMark { account, marked }));
        Ok(())
    }

    /// Approve `order` for filling. Only its maker may approve it.
    pub fn approve_order(&mut self, sender: AccountId, order: &Order) -> Result<OrderHash> {
        let _span = trace_operation("approve_order", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_order_status(&mut tx, sender, order, OrderStatusChange::Approved);
        self.finish("approve_order", tx, result)
    }

    pub fn cancel_order(&mut self, sender: AccountId, order: &Order) -> Result<OrderHash> {
        let _span = trace_operation("cancel_order", &sender).entered();
        let mut tx = self.begin();
        let result = self.apply_order_status(&mut tx, sender, order, OrderStatusChange::Canceled);
        self.finish("cancel_order", tx, result)
    }

    fn apply_order_status(
        &self,
        tx: &mut Transaction,
        sender: AccountId,
        order: &Order,
        change: OrderStatusChange,
    ) -> Result<OrderHash> {
        let hash = match change {
            OrderStatusChange::Approved => tx.state.orders.approve(sender, order)?,
            OrderStatusChange::Canceled => tx.state.orders.cancel(sender, order)?,
        };

        tracing::debug!(hash = %hash, ?change, "Order status updated");
        tx.emit(Event::OrderStatus(OrderStatusUpdate {
            hash,
            maker: order.maker,
            change,
        }));
        Ok(hash)
    }
}
