//! Event sinks: where committed-operation notifications are delivered.
//!
//! Delivery is best effort. The ledger logs a sink failure and carries on;
//! it never rolls back an operation because a notification was lost.

use std::collections::VecDeque;

use sharepool_types::{PoolEvent, PoolEventRecord, Result, SharePoolError};

/// Receives one record per committed operation.
pub trait EventSink {
    fn emit(&mut self, record: &PoolEventRecord) -> Result<()>;
}

/// Writes each event as a structured `tracing` line at INFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&mut self, record: &PoolEventRecord) -> Result<()> {
        match record.event {
            PoolEvent::Deposit { account, amount } => tracing::info!(
                seq = record.sequence,
                account = %account,
                amount = %amount,
                "Deposit"
            ),
            PoolEvent::Withdraw { account, amount } => tracing::info!(
                seq = record.sequence,
                account = %account,
                amount = %amount,
                "Withdraw"
            ),
            PoolEvent::RewardDeposited { operator, amount } => tracing::info!(
                seq = record.sequence,
                operator = %operator,
                amount = %amount,
                "RewardDeposited"
            ),
            PoolEvent::DustSwept { amount } => tracing::info!(
                seq = record.sequence,
                amount = %amount,
                "DustSwept"
            ),
        }
        Ok(())
    }
}

/// Bounded in-memory journal of emitted records.
///
/// When the journal reaches `capacity`, the oldest record is evicted to make
/// room, so memory stays predictable in long-running processes.
#[derive(Debug, Clone)]
pub struct EventJournal {
    records: VecDeque<PoolEventRecord>,
    capacity: usize,
}

impl EventJournal {
    /// Create a journal holding at most `capacity` records.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "EventJournal capacity must be > 0");
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &PoolEventRecord> {
        self.records.iter()
    }

    /// Retained events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<PoolEvent> {
        self.records.iter().map(|r| r.event).collect()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PoolEventRecord> {
        self.records.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(sharepool_types::constants::DEFAULT_JOURNAL_CAPACITY)
    }
}

impl EventSink for EventJournal {
    fn emit(&mut self, record: &PoolEventRecord) -> Result<()> {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record.clone());
        Ok(())
    }
}

/// A sink that always fails. Used to prove delivery failures never roll
/// back ledger operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEventSink;

impl EventSink for FailingEventSink {
    fn emit(&mut self, record: &PoolEventRecord) -> Result<()> {
        Err(SharePoolError::Internal(format!(
            "sink unavailable for event #{}",
            record.sequence
        )))
    }
}

/// Fan out to two sinks. Both are always attempted; the first error wins.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, record: &PoolEventRecord) -> Result<()> {
        let first = self.0.emit(record);
        let second = self.1.emit(record);
        first.and(second)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sharepool_types::AccountId;

    use super::*;

    fn record(sequence: u64) -> PoolEventRecord {
        PoolEventRecord {
            sequence,
            at: Utc::now(),
            event: PoolEvent::Deposit {
                account: AccountId::from_bytes([1; 20]),
                amount: u128::from(sequence),
            },
        }
    }

    #[test]
    fn journal_keeps_order() {
        let mut journal = EventJournal::new(10);
        for seq in 1..=3 {
            journal.emit(&record(seq)).unwrap();
        }
        let seqs: Vec<u64> = journal.records().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(journal.last().map(|r| r.sequence), Some(3));
    }

    #[test]
    fn journal_evicts_oldest() {
        let mut journal = EventJournal::new(2);
        for seq in 1..=3 {
            journal.emit(&record(seq)).unwrap();
        }
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.records().next().map(|r| r.sequence), Some(2));
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = EventJournal::new(0);
    }

    #[test]
    fn tracing_sink_never_fails() {
        assert!(TracingEventSink.emit(&record(1)).is_ok());
    }

    #[test]
    fn fan_out_reaches_both_even_on_error() {
        let mut pair = (FailingEventSink, EventJournal::new(4));
        assert!(pair.emit(&record(1)).is_err());
        assert_eq!(pair.1.len(), 1);

        let mut ok_pair = (EventJournal::new(4), TracingEventSink);
        assert!(ok_pair.emit(&record(2)).is_ok());
        assert!(!ok_pair.0.is_empty());
    }
}
