use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::error::{Error, Result};
use crate::events::admin::AdminEvent;
use crate::events::balance::{AccountSettled, BalanceUpdate};
use crate::events::funding::{FundingRateUpdated, IndexUpdated};
use crate::events::liquidation::{Deleveraged, DeleveragingMark, Liquidated};
use crate::events::order::{OrderFilled, OrderStatusUpdate};
use crate::events::trade::TradeEvent;

/// Everything the engine reports to its host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    IndexUpdated(IndexUpdated),
    FundingRateUpdated(FundingRateUpdated),
    AccountSettled(AccountSettled),
    BalanceUpdate(BalanceUpdate),
    Trade(TradeEvent),
    Liquidated(Liquidated),
    Deleveraged(Deleveraged),
    DeleveragingMark(DeleveragingMark),
    OrderStatus(OrderStatusUpdate),
    OrderFilled(OrderFilled),
    Admin(AdminEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::IndexUpdated(_) => "index_updated",
            Event::FundingRateUpdated(_) => "funding_rate_updated",
            Event::AccountSettled(_) => "account_settled",
            Event::BalanceUpdate(_) => "balance_update",
            Event::Trade(_) => "trade",
            Event::Liquidated(_) => "liquidated",
            Event::Deleveraged(_) => "deleveraged",
            Event::DeleveragingMark(_) => "deleveraging_mark",
            Event::OrderStatus(_) => "order_status",
            Event::OrderFilled(_) => "order_filled",
            Event::Admin(_) => "admin",
        }
    }
}

/// A committed event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub timestamp: u64,
    pub event: Event,
    pub checksum: String,
}

impl EventRecord {
    pub fn new(sequence: u64, timestamp: u64, event: Event) -> Result<Self> {
        let checksum = Self::calculate_checksum(sequence, timestamp, &event)?;
        Ok(EventRecord {
            sequence,
            timestamp,
            event,
            checksum,
        })
    }

    fn calculate_checksum(sequence: u64, timestamp: u64, event: &Event) -> Result<String> {
        let payload = bincode::serialize(event)
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(sequence.to_le_bytes());
        hasher.update(timestamp.to_le_bytes());
        hasher.update(&payload);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Verify event checksum
    pub fn verify_checksum(&self) -> bool {
        Self::calculate_checksum(self.sequence, self.timestamp, &self.event)
            .map(|checksum| checksum == self.checksum)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::index::Index;
    use crate::types::signed::SignedValue;

    fn index_event(value: i128) -> Event {
        Event::IndexUpdated(IndexUpdated {
            index: Index::new(10, SignedValue::from_i128(value)),
        })
    }

    #[test]
    fn test_checksum_detects_tampering() {
        let mut record = EventRecord::new(3, 10, index_event(5)).unwrap();
        assert!(record.verify_checksum());

        record.event = index_event(6);
        assert!(!record.verify_checksum());
    }

    #[test]
    fn test_record_survives_bincode() {
        let record = EventRecord::new(0, 10, index_event(-5)).unwrap();
        let bytes = bincode::serialize(&record).unwrap();
        let decoded: EventRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, record);
        assert!(decoded.verify_checksum());
    }
}
