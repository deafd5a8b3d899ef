//! Live event fan-out over a tokio broadcast channel.

use sharepool_ledger::EventSink;
use sharepool_types::{PoolEventRecord, Result, SharePoolError};
use tokio::sync::broadcast;

/// Publishes every committed event to all current subscribers.
///
/// Having no subscribers is not a failure. A subscriber that falls more than
/// `capacity` events behind sees `RecvError::Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<PoolEventRecord>,
}

impl BroadcastSink {
    /// # Errors
    /// `Configuration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SharePoolError::Configuration(
                "event broadcast capacity must be > 0".into(),
            ));
        }
        let (sender, _) = broadcast::channel(capacity);
        Ok(Self { sender })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PoolEventRecord> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&mut self, record: &PoolEventRecord) -> Result<()> {
        // Err only means nobody is listening.
        let _ = self.sender.send(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sharepool_types::{AccountId, PoolEvent};

    use super::*;

    fn record(sequence: u64) -> PoolEventRecord {
        PoolEventRecord {
            sequence,
            at: Utc::now(),
            event: PoolEvent::Withdraw {
                account: AccountId::ZERO,
                amount: 1,
            },
        }
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            BroadcastSink::new(0),
            Err(SharePoolError::Configuration(_))
        ));
    }

    #[test]
    fn emit_without_subscribers_is_ok() {
        let mut sink = BroadcastSink::new(4).unwrap();
        assert_eq!(sink.subscriber_count(), 0);
        assert!(sink.emit(&record(1)).is_ok());
    }

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let mut sink = BroadcastSink::new(4).unwrap();
        let mut rx = sink.subscribe();
        sink.emit(&record(1)).unwrap();
        sink.emit(&record(2)).unwrap();
        assert_eq!(rx.recv().await.unwrap().sequence, 1);
        assert_eq!(rx.recv().await.unwrap().sequence, 2);
    }
}
