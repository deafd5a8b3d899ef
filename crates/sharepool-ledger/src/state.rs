//! Ledger state: per-participant shares and the pool aggregates.
//!
//! `LedgerState` only stores numbers. Its mutations do not validate: the
//! [`ShareLedger`](crate::ShareLedger) checks every precondition first and
//! then applies a mutation that cannot fail. A participant entry exists only
//! while it holds shares.
//!
//! The state serializes completely (holdings, aggregates, dust counters,
//! pending payouts and the last event sequence), so a persisted copy can be
//! handed back to [`ShareLedger::restore`](crate::ShareLedger::restore).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sharepool_types::{AccountId, PoolSnapshot, Result, SharePoolError, Shares, Value, constants};

/// Per-participant share balances plus the pool aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Shares held per participant. No zero entries.
    shares: HashMap<AccountId, Shares>,
    total_shares: Shares,
    total_value: Value,
    swept_dust: Value,
    carried_dust: Value,
    /// Committed payouts custody failed to deliver, per participant.
    pending_payouts: HashMap<AccountId, Value>,
    /// Sequence number of the last emitted event.
    #[serde(default)]
    last_sequence: u64,
}

impl LedgerState {
    /// Create an empty pool: `total_shares = total_value = 0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from persisted holdings and its total value.
    ///
    /// Zero holdings are dropped and duplicate accounts are merged.
    ///
    /// # Errors
    /// - `ArithmeticOverflow` if the holdings sum past 128 bits
    /// - `ConservationViolation` if shares are outstanding against zero value
    pub fn from_parts(
        holdings: impl IntoIterator<Item = (AccountId, Shares)>,
        total_value: Value,
    ) -> Result<Self> {
        let mut state = Self {
            total_value,
            ..Self::default()
        };
        for (account, shares) in holdings {
            if shares == 0 {
                continue;
            }
            state.total_shares = state
                .total_shares
                .checked_add(shares)
                .ok_or(SharePoolError::ArithmeticOverflow { operation: "restore: total_shares" })?;
            *state.shares.entry(account).or_insert(0) += shares;
        }
        state.validate()?;
        Ok(state)
    }

    /// Check the structural invariants of a state obtained from outside the
    /// ledger (deserialized or rebuilt from parts).
    ///
    /// # Errors
    /// `ConservationViolation` naming the first broken invariant, or
    /// `ArithmeticOverflow` if the holdings sum past 128 bits.
    pub fn validate(&self) -> Result<()> {
        let mut sum: Shares = 0;
        for (account, &shares) in &self.shares {
            if shares == 0 {
                return Err(SharePoolError::ConservationViolation {
                    reason: format!("{account} has a zero share entry"),
                });
            }
            sum = sum
                .checked_add(shares)
                .ok_or(SharePoolError::ArithmeticOverflow { operation: "validate: total_shares" })?;
        }
        if sum != self.total_shares {
            return Err(SharePoolError::ConservationViolation {
                reason: format!("holdings sum to {sum}, total_shares is {}", self.total_shares),
            });
        }
        if self.total_shares > 0 && self.total_value == 0 {
            return Err(SharePoolError::ConservationViolation {
                reason: format!("{} shares outstanding against zero pool value", self.total_shares),
            });
        }
        if let Some((account, _)) = self.pending_payouts.iter().find(|(_, v)| **v == 0) {
            return Err(SharePoolError::ConservationViolation {
                reason: format!("{account} has a zero pending payout"),
            });
        }
        Ok(())
    }

    /// Shares held by `account` (zero if absent).
    #[must_use]
    pub fn shares_of(&self, account: &AccountId) -> Shares {
        self.shares.get(account).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_shares(&self) -> Shares {
        self.total_shares
    }

    #[must_use]
    pub fn total_value(&self) -> Value {
        self.total_value
    }

    #[must_use]
    pub fn swept_dust(&self) -> Value {
        self.swept_dust
    }

    #[must_use]
    pub fn carried_dust(&self) -> Value {
        self.carried_dust
    }

    /// Number of participants currently holding shares.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.shares.len()
    }

    /// Iterate over `(participant, shares)` pairs in arbitrary order.
    pub fn participants(&self) -> impl Iterator<Item = (&AccountId, &Shares)> {
        self.shares.iter()
    }

    /// Pending payout owed to `account` (zero if none).
    #[must_use]
    pub fn pending_payout(&self, account: &AccountId) -> Value {
        self.pending_payouts.get(account).copied().unwrap_or(0)
    }

    /// Sequence number of the last emitted event (0 if none).
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Sum of all pending payouts.
    #[must_use]
    pub fn total_pending(&self) -> Value {
        self.pending_payouts
            .values()
            .fold(0, |acc: Value, v| acc.saturating_add(*v))
    }

    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            total_shares: self.total_shares,
            total_value: self.total_value,
            participant_count: self.shares.len(),
            swept_dust: self.swept_dust,
            carried_dust: self.carried_dust,
            pending_payouts: self.total_pending(),
        }
    }

    // -----------------------------------------------------------------
    // Mutations (caller has validated; none of these can fail)
    // -----------------------------------------------------------------

    /// Credit `minted` shares to `account` and `amount` to the pool.
    pub(crate) fn apply_deposit(&mut self, account: AccountId, minted: Shares, amount: Value) {
        *self.shares.entry(account).or_insert(0) += minted;
        self.total_shares += minted;
        self.total_value += amount;
    }

    /// Burn all of `account`'s shares and release `payout` from the pool.
    /// Returns the shares burned.
    pub(crate) fn apply_withdraw(&mut self, account: &AccountId, payout: Value) -> Shares {
        let burned = self.shares.remove(account).unwrap_or(0);
        self.total_shares -= burned;
        self.total_value -= payout;
        burned
    }

    /// Add `amount` to the pool value without minting shares.
    pub(crate) fn apply_reward(&mut self, amount: Value) {
        self.total_value += amount;
    }

    /// Move all of `total_value` out to the swept counter. Returns the amount.
    pub(crate) fn sweep_dust(&mut self) -> Value {
        let dust = std::mem::take(&mut self.total_value);
        self.swept_dust = self.swept_dust.saturating_add(dust);
        dust
    }

    /// Park all of `total_value` until the next reward. Returns the amount.
    pub(crate) fn carry_dust(&mut self) -> Value {
        let dust = std::mem::take(&mut self.total_value);
        self.carried_dust = self.carried_dust.saturating_add(dust);
        dust
    }

    /// Take the carried dust so it can join a reward.
    pub(crate) fn take_carried_dust(&mut self) -> Value {
        std::mem::take(&mut self.carried_dust)
    }

    pub(crate) fn add_pending(&mut self, account: AccountId, amount: Value) {
        let entry = self.pending_payouts.entry(account).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub(crate) fn take_pending(&mut self, account: &AccountId) -> Option<Value> {
        self.pending_payouts.remove(account)
    }

    /// Advance and return the event sequence.
    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    // -----------------------------------------------------------------
    // Digest
    // -----------------------------------------------------------------

    /// SHA-256 digest over the canonical (sorted) state.
    ///
    /// Two states have the same digest iff every counter and every
    /// participant entry is identical.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::STATE_DIGEST_DOMAIN);
        hasher.update(self.total_shares.to_le_bytes());
        hasher.update(self.total_value.to_le_bytes());
        hasher.update(self.swept_dust.to_le_bytes());
        hasher.update(self.carried_dust.to_le_bytes());
        hasher.update(self.last_sequence.to_le_bytes());

        let mut holders: Vec<_> = self.shares.iter().collect();
        holders.sort_unstable_by_key(|(id, _)| **id);
        hasher.update((holders.len() as u64).to_le_bytes());
        for (id, shares) in holders {
            hasher.update(id.as_bytes());
            hasher.update(shares.to_le_bytes());
        }

        let mut pending: Vec<_> = self.pending_payouts.iter().collect();
        pending.sort_unstable_by_key(|(id, _)| **id);
        hasher.update((pending.len() as u64).to_le_bytes());
        for (id, amount) in pending {
            hasher.update(id.as_bytes());
            hasher.update(amount.to_le_bytes());
        }

        hasher.finalize().into()
    }

    /// Hex rendering of [`LedgerState::digest`] for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
