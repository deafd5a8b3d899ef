//! The operation API: deposit, withdraw, reward injection, balance query.
//!
//! Every mutating operation follows the same shape:
//!
//! 1. Validate all preconditions against the current aggregates
//! 2. Compute the exchange-rate conversion and every new counter value
//! 3. Commit the state change (cannot fail past this point)
//! 4. Emit exactly one event
//! 5. Only then touch the outside world (custody transfer)
//!
//! A failure in steps 1–2 leaves the ledger untouched. Because the state
//! is committed before custody is called, a second withdrawal by the same
//! participant sees zero shares and cannot be paid twice.

use chrono::Utc;
use rust_decimal::Decimal;
use sharepool_types::{
    AccountId, DepositReceipt, DustPolicy, PoolConfig, PoolEvent, PoolEventRecord, PoolSnapshot,
    Result, SharePoolError, Shares, Value, WithdrawReceipt,
};

use crate::access::{AccessControl, SingleOperator};
use crate::conservation::ValueConservation;
use crate::custody::ValueCustody;
use crate::exchange_rate;
use crate::sink::EventSink;
use crate::state::LedgerState;

/// Proportional-share ledger over a single pool.
///
/// Generic over its three collaborators so each can be swapped or observed
/// independently: `A` gates reward injection, `C` moves value, `S` receives
/// notifications.
pub struct ShareLedger<A, C, S> {
    state: LedgerState,
    conservation: ValueConservation,
    dust_policy: DustPolicy,
    access: A,
    custody: C,
    sink: S,
}

impl<C: ValueCustody, S: EventSink> ShareLedger<SingleOperator, C, S> {
    /// Build a ledger whose operator and dust policy come from `config`.
    #[must_use]
    pub fn from_config(config: &PoolConfig, custody: C, sink: S) -> Self {
        Self::new(
            config.dust_policy,
            SingleOperator::new(config.operator),
            custody,
            sink,
        )
    }
}

impl<A, C, S> ShareLedger<A, C, S>
where
    A: AccessControl,
    C: ValueCustody,
    S: EventSink,
{
    /// Create a ledger with an empty pool.
    #[must_use]
    pub fn new(dust_policy: DustPolicy, access: A, custody: C, sink: S) -> Self {
        Self {
            state: LedgerState::new(),
            conservation: ValueConservation::new(),
            dust_policy,
            access,
            custody,
            sink,
        }
    }

    /// Resume from previously persisted state.
    ///
    /// The value already in the pool becomes the conservation checker's
    /// opening balance. Pending payouts were counted as withdrawn when they
    /// were committed, so they stay owed but are not part of the pool.
    /// Event sequences continue after the restored `last_sequence`.
    ///
    /// # Errors
    /// Whatever [`LedgerState::validate`] reports for an inconsistent state.
    pub fn restore(
        state: LedgerState,
        dust_policy: DustPolicy,
        access: A,
        custody: C,
        sink: S,
    ) -> Result<Self> {
        state.validate()?;
        let opening = state.total_value().saturating_add(state.carried_dust());
        tracing::info!(
            participants = state.participant_count(),
            total_shares = %state.total_shares(),
            total_value = %state.total_value(),
            pending = %state.total_pending(),
            last_sequence = state.last_sequence(),
            digest = %state.digest_hex(),
            "Ledger restored"
        );
        Ok(Self {
            state,
            conservation: ValueConservation::with_opening_balance(opening),
            dust_policy,
            access,
            custody,
            sink,
        })
    }

    // =================================================================
    // Operations
    // =================================================================

    /// Deposit `amount` for `account`, minting shares at the current rate.
    ///
    /// The value must already be in custody; the boundary layer takes
    /// receipt before calling this.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount == 0`
    /// - `DepositTooSmall` if the amount would mint zero shares
    /// - `ArithmeticOverflow` if a counter would exceed 128 bits
    pub fn deposit(&mut self, account: AccountId, amount: Value) -> Result<DepositReceipt> {
        if amount == 0 {
            return Err(SharePoolError::InvalidAmount);
        }

        let total_shares = self.state.total_shares();
        let total_value = self.state.total_value();
        // Value sitting in a pool nobody holds shares in.
        let stale = if total_shares == 0 { total_value } else { 0 };
        let kept_value = if stale > 0 && self.dust_policy != DustPolicy::Retain {
            0
        } else {
            total_value
        };

        let minted = exchange_rate::shares_for_deposit(amount, total_shares, kept_value)?;
        if minted == 0 {
            return Err(SharePoolError::DepositTooSmall { amount });
        }
        total_shares
            .checked_add(minted)
            .ok_or(SharePoolError::ArithmeticOverflow { operation: "deposit: total_shares" })?;
        kept_value
            .checked_add(amount)
            .ok_or(SharePoolError::ArithmeticOverflow { operation: "deposit: total_value" })?;

        if stale > 0 {
            self.settle_dust();
        }
        self.state.apply_deposit(account, minted, amount);
        self.conservation.record_deposit(amount);
        let sequence = self.emit(PoolEvent::Deposit { account, amount });

        tracing::debug!(
            account = %account,
            amount = %amount,
            minted = %minted,
            total_shares = %self.state.total_shares(),
            total_value = %self.state.total_value(),
            "Deposit committed"
        );

        Ok(DepositReceipt {
            account,
            amount,
            shares_minted: minted,
            sequence,
        })
    }

    /// Withdraw `account`'s entire position.
    ///
    /// # Errors
    /// - `NoBalance` if the account holds no shares
    /// - `CustodyTransferFailed` if the withdrawal was committed but custody
    ///   could not pay; the payout is kept as pending for [`Self::claim_pending`]
    pub fn withdraw(&mut self, account: AccountId) -> Result<WithdrawReceipt> {
        let shares = self.state.shares_of(&account);
        if shares == 0 {
            return Err(SharePoolError::NoBalance(account));
        }
        let payout = exchange_rate::value_for_shares(
            shares,
            self.state.total_shares(),
            self.state.total_value(),
        )?;

        // Commit before any external call.
        let burned = self.state.apply_withdraw(&account, payout);
        self.conservation.record_withdrawal(payout);
        let sequence = self.emit(PoolEvent::Withdraw {
            account,
            amount: payout,
        });

        tracing::debug!(
            account = %account,
            payout = %payout,
            burned = %burned,
            total_shares = %self.state.total_shares(),
            total_value = %self.state.total_value(),
            "Withdraw committed"
        );

        self.pay_out(account, payout)?;

        Ok(WithdrawReceipt {
            account,
            amount_paid: payout,
            shares_burned: burned,
            sequence,
        })
    }

    /// Inject `amount` of rewards on behalf of `operator`. No shares are
    /// minted, so every current holder's balance rises in proportion to
    /// their shares.
    ///
    /// # Errors
    /// - `Unauthorized` if `operator` fails the access-control check
    /// - `EmptyPool` if no participant holds shares
    /// - `InvalidAmount` if `amount == 0`
    /// - `ArithmeticOverflow` if `total_value` would exceed 128 bits
    pub fn deposit_reward(&mut self, operator: AccountId, amount: Value) -> Result<()> {
        if !self.access.is_authorized_operator(&operator) {
            return Err(SharePoolError::Unauthorized(operator));
        }
        if self.state.total_shares() == 0 {
            return Err(SharePoolError::EmptyPool);
        }
        if amount == 0 {
            return Err(SharePoolError::InvalidAmount);
        }

        let carried = self.state.carried_dust();
        let credited = amount
            .checked_add(carried)
            .filter(|c| self.state.total_value().checked_add(*c).is_some())
            .ok_or(SharePoolError::ArithmeticOverflow { operation: "deposit_reward" })?;

        let carried = self.state.take_carried_dust();
        self.state.apply_reward(credited);
        self.conservation.record_reward(amount);
        self.emit(PoolEvent::RewardDeposited { operator, amount });

        tracing::debug!(
            operator = %operator,
            amount = %amount,
            carried_dust = %carried,
            total_shares = %self.state.total_shares(),
            total_value = %self.state.total_value(),
            "Reward committed"
        );
        Ok(())
    }

    /// Current redeemable value of `account`'s shares. Zero for unknown
    /// accounts. Uses the same formula as the withdrawal payout.
    #[must_use]
    pub fn balance_of(&self, account: &AccountId) -> Value {
        // shares ≤ total_shares, so the quotient is at most total_value.
        exchange_rate::value_for_shares(
            self.state.shares_of(account),
            self.state.total_shares(),
            self.state.total_value(),
        )
        .unwrap_or(0)
    }

    /// Retry delivery of a payout whose custody transfer failed.
    ///
    /// # Errors
    /// - `NoPendingPayout` if nothing is owed to `account`
    /// - `CustodyTransferFailed` if custody fails again (amount stays pending)
    pub fn claim_pending(&mut self, account: AccountId) -> Result<Value> {
        let amount = self
            .state
            .take_pending(&account)
            .ok_or(SharePoolError::NoPendingPayout(account))?;
        self.pay_out(account, amount)?;
        tracing::info!(account = %account, amount = %amount, "Pending payout delivered");
        Ok(amount)
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn shares_of(&self, account: &AccountId) -> Shares {
        self.state.shares_of(account)
    }

    #[must_use]
    pub fn total_shares(&self) -> Shares {
        self.state.total_shares()
    }

    #[must_use]
    pub fn total_value(&self) -> Value {
        self.state.total_value()
    }

    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.state.participant_count()
    }

    #[must_use]
    pub fn pending_payout(&self, account: &AccountId) -> Value {
        self.state.pending_payout(account)
    }

    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        self.state.snapshot()
    }

    /// Value per share, `None` for an empty pool.
    #[must_use]
    pub fn exchange_rate(&self) -> Option<Decimal> {
        exchange_rate::exchange_rate(self.state.total_shares(), self.state.total_value())
    }

    #[must_use]
    pub fn dust_policy(&self) -> DustPolicy {
        self.dust_policy
    }

    /// Digest of the full ledger state; equal digests mean identical state.
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        self.state.digest()
    }

    /// Full state, e.g. to persist it for a later [`Self::restore`].
    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    #[must_use]
    pub fn conservation(&self) -> &ValueConservation {
        &self.conservation
    }

    /// Audit both conservation invariants. O(participants).
    pub fn verify_conservation(&self) -> Result<()> {
        self.conservation.verify(&self.state)
    }

    // =================================================================
    // Collaborators
    // =================================================================

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // =================================================================
    // Internals
    // =================================================================

    /// Stamp and deliver one event. Sink failures are logged, not returned.
    fn emit(&mut self, event: PoolEvent) -> u64 {
        let sequence = self.state.next_sequence();
        let record = PoolEventRecord {
            sequence,
            at: Utc::now(),
            event,
        };
        if let Err(e) = self.sink.emit(&record) {
            tracing::warn!(seq = record.sequence, event = %event, error = %e, "Event delivery failed");
        }
        sequence
    }

    /// Apply the dust policy to value left in a pool with no shares, just
    /// before the bootstrap deposit mints at 1:1.
    fn settle_dust(&mut self) {
        let dust = self.state.total_value();
        match self.dust_policy {
            DustPolicy::Retain => {
                tracing::debug!(dust = %dust, "Dust absorbed by bootstrap depositor");
            }
            DustPolicy::Sweep => {
                let swept = self.state.sweep_dust();
                self.conservation.record_sweep(swept);
                self.emit(PoolEvent::DustSwept { amount: swept });
                tracing::debug!(dust = %swept, "Dust swept before bootstrap deposit");
            }
            DustPolicy::CarryToNextReward => {
                let carried = self.state.carry_dust();
                tracing::debug!(dust = %carried, "Dust carried to next reward");
            }
        }
    }

    /// Ask custody to pay `amount` to `account`; on failure keep it pending.
    fn pay_out(&mut self, account: AccountId, amount: Value) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        if let Err(e) = self.custody.credit(account, amount) {
            self.state.add_pending(account, amount);
            tracing::warn!(
                account = %account,
                amount = %amount,
                error = %e,
                "Custody transfer failed, payout kept pending"
            );
            return Err(SharePoolError::CustodyTransferFailed {
                account,
                amount,
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}
