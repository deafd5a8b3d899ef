//! Results returned to callers of value-moving operations.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Shares, Value};

/// Outcome of a committed deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub account: AccountId,
    /// Value accepted into the pool.
    pub amount: Value,
    /// Shares minted at the exchange rate in force when the deposit began.
    pub shares_minted: Shares,
    /// Sequence number of the `Deposit` event.
    pub sequence: u64,
}

/// Outcome of a committed withdrawal whose payout custody delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub account: AccountId,
    /// Value paid out to the participant.
    pub amount_paid: Value,
    /// Shares burned (the participant's entire holding).
    pub shares_burned: Shares,
    /// Sequence number of the `Withdraw` event.
    pub sequence: u64,
}
