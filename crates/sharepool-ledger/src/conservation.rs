//! Value conservation checker.
//!
//! Two invariants are audited on demand:
//!
//! ```text
//! flows:  Σdeposits + Σrewards − Σwithdrawals − Σswept == total_value + carried_dust
//! claims: Σ ⌊shares · total_value / total_shares⌋     ≤ total_value
//! ```
//!
//! The first proves no value was created or destroyed by the accounting;
//! the second proves participants can never, in aggregate, withdraw more
//! than the pool holds. The claims check is O(n) and is an audit tool, not
//! part of any hot path.

use sharepool_types::{Result, SharePoolError, Value};

use crate::exchange_rate;
use crate::state::LedgerState;

/// Running totals of every value flow into and out of the pool.
///
/// Totals saturate at `u128::MAX`; the flow check is meaningful as long as
/// lifetime flows stay below that bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueConservation {
    /// Value already in the pool when tracking began.
    opening: Value,
    deposited: Value,
    rewarded: Value,
    withdrawn: Value,
    swept: Value,
}

impl ValueConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a pool that already holds `opening` value.
    #[must_use]
    pub fn with_opening_balance(opening: Value) -> Self {
        Self {
            opening,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn opening_balance(&self) -> Value {
        self.opening
    }

    pub fn record_deposit(&mut self, amount: Value) {
        self.deposited = self.deposited.saturating_add(amount);
    }

    pub fn record_reward(&mut self, amount: Value) {
        self.rewarded = self.rewarded.saturating_add(amount);
    }

    pub fn record_withdrawal(&mut self, amount: Value) {
        self.withdrawn = self.withdrawn.saturating_add(amount);
    }

    pub fn record_sweep(&mut self, amount: Value) {
        self.swept = self.swept.saturating_add(amount);
    }

    #[must_use]
    pub fn total_deposited(&self) -> Value {
        self.deposited
    }

    #[must_use]
    pub fn total_rewarded(&self) -> Value {
        self.rewarded
    }

    #[must_use]
    pub fn total_withdrawn(&self) -> Value {
        self.withdrawn
    }

    #[must_use]
    pub fn total_swept(&self) -> Value {
        self.swept
    }

    /// Value that should be in the pool (including parked dust).
    ///
    /// Returns `None` if outflows exceed inflows, which is itself a violation.
    #[must_use]
    pub fn expected_in_pool(&self) -> Option<Value> {
        self.opening
            .checked_add(self.deposited)?
            .checked_add(self.rewarded)?
            .checked_sub(self.withdrawn)?
            .checked_sub(self.swept)
    }

    /// Verify the flow invariant against the actual ledger state.
    ///
    /// # Errors
    /// Returns [`SharePoolError::ConservationViolation`] if they disagree.
    pub fn verify_flows(&self, state: &LedgerState) -> Result<()> {
        let actual = state.total_value().saturating_add(state.carried_dust());
        match self.expected_in_pool() {
            Some(expected) if expected == actual => Ok(()),
            expected => Err(SharePoolError::ConservationViolation {
                reason: format!(
                    "pool holds {actual} but flows imply {expected:?} \
                     (opening={}, deposited={}, rewarded={}, withdrawn={}, swept={})",
                    self.opening,
                    self.deposited, self.rewarded, self.withdrawn, self.swept
                ),
            }),
        }
    }

    /// Verify that the sum of every participant's redeemable value does
    /// not exceed the pool value, and that no holder exceeds the total.
    ///
    /// # Errors
    /// Returns [`SharePoolError::ConservationViolation`] on failure.
    pub fn verify_claims(state: &LedgerState) -> Result<()> {
        let total_shares = state.total_shares();
        let total_value = state.total_value();
        let mut claimed: Value = 0;
        let mut share_sum: Value = 0;

        for (account, &shares) in state.participants() {
            if shares > total_shares {
                return Err(SharePoolError::ConservationViolation {
                    reason: format!("{account} holds {shares} > total {total_shares}"),
                });
            }
            share_sum = share_sum.saturating_add(shares);
            let value = exchange_rate::value_for_shares(shares, total_shares, total_value)?;
            claimed = claimed.saturating_add(value);
        }

        if share_sum != total_shares {
            return Err(SharePoolError::ConservationViolation {
                reason: format!("participant shares sum to {share_sum}, total is {total_shares}"),
            });
        }
        if claimed > total_value {
            return Err(SharePoolError::ConservationViolation {
                reason: format!("claims {claimed} exceed pool value {total_value}"),
            });
        }
        Ok(())
    }

    /// Both checks.
    ///
    /// # Errors
    /// Returns the first [`SharePoolError::ConservationViolation`] found.
    pub fn verify(&self, state: &LedgerState) -> Result<()> {
        self.verify_flows(state)?;
        Self::verify_claims(state)
    }
}
