//! Value custody: the actual movement of value into and out of the pool.
//!
//! The ledger only does bookkeeping. Incoming value is taken into custody by
//! the boundary layer (`debit_on_receipt`) before the ledger is called, and
//! the ledger asks custody to `credit` a participant only after it has
//! committed a withdrawal.

use std::collections::HashMap;

use sharepool_types::{AccountId, Result, SharePoolError, Value};

/// Moves value between external accounts and the pool's custody.
pub trait ValueCustody {
    /// Record `amount` already received from `from` into custody.
    fn debit_on_receipt(&mut self, from: AccountId, amount: Value) -> Result<()>;

    /// Transfer `amount` out of custody to `to`.
    fn credit(&mut self, to: AccountId, amount: Value) -> Result<()>;
}

/// In-process custody that tracks held value and per-account flows.
///
/// Credits fail when custody does not hold enough value, or when failures
/// have been switched on with [`InMemoryCustody::set_fail_credits`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustody {
    held: Value,
    received: HashMap<AccountId, Value>,
    paid: HashMap<AccountId, Value>,
    fail_credits: bool,
}

impl InMemoryCustody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value currently held in custody.
    #[must_use]
    pub fn held(&self) -> Value {
        self.held
    }

    /// Total received from `account`.
    #[must_use]
    pub fn received_from(&self, account: &AccountId) -> Value {
        self.received.get(account).copied().unwrap_or(0)
    }

    /// Total paid out to `account`.
    #[must_use]
    pub fn paid_to(&self, account: &AccountId) -> Value {
        self.paid.get(account).copied().unwrap_or(0)
    }

    /// Make every subsequent `credit` fail (simulates an unreachable payee).
    pub fn set_fail_credits(&mut self, fail: bool) {
        self.fail_credits = fail;
    }
}

impl ValueCustody for InMemoryCustody {
    fn debit_on_receipt(&mut self, from: AccountId, amount: Value) -> Result<()> {
        let held = self
            .held
            .checked_add(amount)
            .ok_or_else(|| SharePoolError::CustodyRejected {
                reason: format!("custody balance overflow receiving {amount}"),
            })?;
        self.held = held;
        let entry = self.received.entry(from).or_insert(0);
        *entry = entry.saturating_add(amount);
        Ok(())
    }

    fn credit(&mut self, to: AccountId, amount: Value) -> Result<()> {
        if self.fail_credits {
            return Err(SharePoolError::CustodyRejected {
                reason: format!("credit to {to} refused"),
            });
        }
        if self.held < amount {
            return Err(SharePoolError::CustodyRejected {
                reason: format!("custody holds {}, cannot pay {amount}", self.held),
            });
        }
        self.held -= amount;
        let entry = self.paid.entry(to).or_insert(0);
        *entry = entry.saturating_add(amount);
        Ok(())
    }
}
