use crate::error::Result;
use crate::events::base::{Event, EventRecord};

/// Append-only log of committed events, drained by the host.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    /// Resume numbering after a restored snapshot.
    pub fn starting_at(next_sequence: u64) -> Self {
        EventLog {
            records: Vec::new(),
            next_sequence,
        }
    }

    /// Append one transaction's events. Either all of them land or none do.
    pub fn append(&mut self, timestamp: u64, events: Vec<Event>) -> Result<()> {
        let mut sequence = self.next_sequence;
        let mut staged = Vec::with_capacity(events.len());
        for event in events {
            staged.push(EventRecord::new(sequence, timestamp, event)?);
            sequence += 1;
        }

        self.records.extend(staged);
        self.next_sequence = sequence;
        Ok(())
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
