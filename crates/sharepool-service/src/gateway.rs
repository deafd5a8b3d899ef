//! Boundary layer between callers carrying value and the ledger.
//!
//! Value arrives with the call. The gateway records receipt with custody
//! first, then runs the ledger operation. If the ledger rejects the call the
//! received value is handed back, so a rejected call never moves value.
//!
//! ```text
//!   Call ──▶ debit_on_receipt ──▶ ShareLedger op ──▶ Outcome
//!                                      │
//!                                      └─ Err ──▶ credit (refund) ──▶ Err
//! ```

use serde::{Deserialize, Serialize};
use sharepool_ledger::{AccessControl, EventSink, ShareLedger, ValueCustody};
use sharepool_types::{AccountId, DepositReceipt, Result, SharePoolError, Value, WithdrawReceipt};

/// A request arriving at the pool boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    /// Value sent to the pool with no instruction. Treated as a deposit.
    Transfer { from: AccountId, value: Value },
    Deposit { from: AccountId, value: Value },
    Withdraw { from: AccountId },
    DepositReward { from: AccountId, value: Value },
    BalanceOf { account: AccountId },
}

impl Call {
    /// Value carried with the call.
    #[must_use]
    pub fn value(&self) -> Value {
        match *self {
            Self::Transfer { value, .. }
            | Self::Deposit { value, .. }
            | Self::DepositReward { value, .. } => value,
            Self::Withdraw { .. } | Self::BalanceOf { .. } => 0,
        }
    }
}

/// Successful result of a [`Call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Deposited(DepositReceipt),
    Withdrawn(WithdrawReceipt),
    RewardAccepted,
    Balance(Value),
}

/// Owns the ledger and routes calls into it.
pub struct Gateway<A, C, S> {
    ledger: ShareLedger<A, C, S>,
}

impl<A, C, S> Gateway<A, C, S>
where
    A: AccessControl,
    C: ValueCustody,
    S: EventSink,
{
    #[must_use]
    pub fn new(ledger: ShareLedger<A, C, S>) -> Self {
        Self { ledger }
    }

    /// Route `call` to the matching ledger operation.
    pub fn dispatch(&mut self, call: Call) -> Result<Outcome> {
        match call {
            Call::Transfer { from, value } => {
                tracing::debug!(from = %from, value = %value, "Raw transfer routed as deposit");
                self.deposit(from, value).map(Outcome::Deposited)
            }
            Call::Deposit { from, value } => self.deposit(from, value).map(Outcome::Deposited),
            Call::Withdraw { from } => self.ledger.withdraw(from).map(Outcome::Withdrawn),
            Call::DepositReward { from, value } => {
                self.deposit_reward(from, value).map(|()| Outcome::RewardAccepted)
            }
            Call::BalanceOf { account } => Ok(Outcome::Balance(self.ledger.balance_of(&account))),
        }
    }

    pub fn deposit(&mut self, from: AccountId, value: Value) -> Result<DepositReceipt> {
        self.with_received(from, value, |ledger| ledger.deposit(from, value))
    }

    pub fn deposit_reward(&mut self, from: AccountId, value: Value) -> Result<()> {
        self.with_received(from, value, |ledger| ledger.deposit_reward(from, value))
    }

    pub fn withdraw(&mut self, from: AccountId) -> Result<WithdrawReceipt> {
        self.ledger.withdraw(from)
    }

    #[must_use]
    pub fn balance_of(&self, account: &AccountId) -> Value {
        self.ledger.balance_of(account)
    }

    pub fn ledger(&self) -> &ShareLedger<A, C, S> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ShareLedger<A, C, S> {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> ShareLedger<A, C, S> {
        self.ledger
    }

    /// Take `value` into custody, run `op`, and refund `value` if `op` fails.
    fn with_received<T>(
        &mut self,
        from: AccountId,
        value: Value,
        op: impl FnOnce(&mut ShareLedger<A, C, S>) -> Result<T>,
    ) -> Result<T> {
        if value > 0 {
            self.ledger.custody_mut().debit_on_receipt(from, value)?;
        }
        let result = op(&mut self.ledger);
        match &result {
            Err(e) if value > 0 => self.refund(from, value, e),
            _ => {}
        }
        result
    }

    fn refund(&mut self, to: AccountId, value: Value, cause: &SharePoolError) {
        match self.ledger.custody_mut().credit(to, value) {
            Ok(()) => tracing::debug!(to = %to, value = %value, cause = %cause, "Refunded rejected call"),
            Err(e) => tracing::error!(
                to = %to,
                value = %value,
                cause = %cause,
                error = %e,
                "Refund of rejected call failed"
            ),
        }
    }
}
