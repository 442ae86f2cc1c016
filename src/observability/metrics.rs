use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use crate::error::Error;
use crate::events::Event;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Funding metrics
    pub static ref INDEX_UPDATES: IntCounter = IntCounter::new(
        "funding_index_updates_total",
        "Total number of global funding index advances"
    ).unwrap();

    pub static ref FUNDING_RATE_UPDATES: IntCounter = IntCounter::new(
        "funding_rate_updates_total",
        "Total number of funding rate updates"
    ).unwrap();

    pub static ref FUNDING_RATE_CLAMPS: IntCounter = IntCounter::new(
        "funding_rate_clamps_total",
        "Funding rate requests clamped to the allowed step"
    ).unwrap();

    // Settlement metrics
    pub static ref SETTLEMENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("account_settlements_total", "Account settlements by direction"),
        &["direction"]
    ).unwrap();

    // Trade metrics
    pub static ref TRADES_EXECUTED: IntCounterVec = IntCounterVec::new(
        Opts::new("trades_executed_total", "Executed trade arguments by trader"),
        &["trader"]
    ).unwrap();

    pub static ref OPERATIONS_COMMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("operations_committed_total", "Committed engine operations"),
        &["operation"]
    ).unwrap();

    pub static ref OPERATIONS_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("operations_rejected_total", "Rejected engine operations by reason"),
        &["operation", "reason"]
    ).unwrap();
}

pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(INDEX_UPDATES.clone()))?;
    REGISTRY.register(Box::new(FUNDING_RATE_UPDATES.clone()))?;
    REGISTRY.register(Box::new(FUNDING_RATE_CLAMPS.clone()))?;
    REGISTRY.register(Box::new(SETTLEMENTS.clone()))?;
    REGISTRY.register(Box::new(TRADES_EXECUTED.clone()))?;
    REGISTRY.register(Box::new(OPERATIONS_COMMITTED.clone()))?;
    REGISTRY.register(Box::new(OPERATIONS_REJECTED.clone()))?;
    Ok(())
}

/// Count what a transaction committed. Rolled-back work is never counted.
pub fn record_committed(operation: &str, events: &[Event]) {
    OPERATIONS_COMMITTED.with_label_values(&[operation]).inc();
    for event in events {
        match event {
            Event::IndexUpdated(_) => INDEX_UPDATES.inc(),
            Event::FundingRateUpdated(_) => FUNDING_RATE_UPDATES.inc(),
            Event::AccountSettled(settled) => {
                let direction = if settled.is_credit { "credit" } else { "debit" };
                SETTLEMENTS.with_label_values(&[direction]).inc();
            }
            Event::Trade(trade) => TRADES_EXECUTED.with_label_values(&[trade.trader.label()]).inc(),
            _ => {}
        }
    }
}

pub fn record_rejected(operation: &str, error: &Error) {
    OPERATIONS_REJECTED.with_label_values(&[operation, error.reason_label()]).inc();
}
