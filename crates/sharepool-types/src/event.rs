//! Notifications emitted for every committed pool operation.
//!
//! Each committed operation produces exactly one [`PoolEvent`], wrapped in a
//! [`PoolEventRecord`] that carries a per-ledger sequence number. Failed
//! operations emit nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Value};

/// What happened to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolEvent {
    /// A participant deposited `amount` (explicitly or by raw transfer).
    Deposit { account: AccountId, amount: Value },
    /// A participant withdrew their full position, receiving `amount`.
    Withdraw { account: AccountId, amount: Value },
    /// The operator injected `amount` of rewards.
    RewardDeposited { operator: AccountId, amount: Value },
    /// Residual dust was removed from an emptied pool.
    DustSwept { amount: Value },
}

impl PoolEvent {
    /// The account the event concerns, if any.
    #[must_use]
    pub fn account(&self) -> Option<AccountId> {
        match self {
            Self::Deposit { account, .. } | Self::Withdraw { account, .. } => Some(*account),
            Self::RewardDeposited { operator, .. } => Some(*operator),
            Self::DustSwept { .. } => None,
        }
    }

    /// The value moved by the event.
    #[must_use]
    pub fn amount(&self) -> Value {
        match self {
            Self::Deposit { amount, .. }
            | Self::Withdraw { amount, .. }
            | Self::RewardDeposited { amount, .. }
            | Self::DustSwept { amount } => *amount,
        }
    }
}

impl std::fmt::Display for PoolEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit { .. } => write!(f, "DEPOSIT"),
            Self::Withdraw { .. } => write!(f, "WITHDRAW"),
            Self::RewardDeposited { .. } => write!(f, "REWARD_DEPOSITED"),
            Self::DustSwept { .. } => write!(f, "DUST_SWEPT"),
        }
    }
}

/// A [`PoolEvent`] stamped with its position in the ledger's event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEventRecord {
    /// Monotonically increasing, starting at 1 for the first committed event.
    pub sequence: u64,
    /// When the operation was committed.
    pub at: DateTime<Utc>,
    pub event: PoolEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_display() {
        let who = AccountId::ZERO;
        assert_eq!(
            format!("{}", PoolEvent::Deposit { account: who, amount: 1 }),
            "DEPOSIT"
        );
        assert_eq!(
            format!("{}", PoolEvent::RewardDeposited { operator: who, amount: 1 }),
            "REWARD_DEPOSITED"
        );
        assert_eq!(format!("{}", PoolEvent::DustSwept { amount: 1 }), "DUST_SWEPT");
    }

    #[test]
    fn accessors() {
        let who = AccountId::from_bytes([7; 20]);
        let ev = PoolEvent::Withdraw { account: who, amount: 99 };
        assert_eq!(ev.account(), Some(who));
        assert_eq!(ev.amount(), 99);
        assert_eq!(PoolEvent::DustSwept { amount: 3 }.account(), None);
    }

    #[test]
    fn record_serde_names_variant() {
        let record = PoolEventRecord {
            sequence: 4,
            at: Utc::now(),
            event: PoolEvent::Deposit {
                account: AccountId::from_bytes([1; 20]),
                amount: 500,
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"deposit\":{"), "Got: {json}");
        let back: PoolEventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
