//! Amount types and the pool aggregate snapshot.
//!
//! Value is counted in the smallest currency unit (e.g. wei). Shares are an
//! internal unit of claim on the pool. Both are unsigned 128-bit integers:
//! there are no negative balances anywhere in the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value in the smallest currency unit.
pub type Value = u128;

/// Share units. Decoupled from [`Value`] so rewards can raise a share's worth
/// without minting.
pub type Shares = u128;

/// Point-in-time copy of the pool aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Sum of all participants' shares.
    pub total_shares: Shares,
    /// Value held by the pool on behalf of shareholders (including dust).
    pub total_value: Value,
    /// Number of participants currently holding shares.
    pub participant_count: usize,
    /// Dust removed from the pool under the sweep policy.
    pub swept_dust: Value,
    /// Dust parked until the next reward injection.
    pub carried_dust: Value,
    /// Committed payouts that custody has not yet delivered.
    pub pending_payouts: Value,
}

impl PoolSnapshot {
    /// Whether no participant holds shares.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// Value of one share, or `None` for an empty pool.
    ///
    /// Reporting only; all accounting uses integer arithmetic. Returns
    /// `None` as well if either counter exceeds `Decimal`'s 96-bit range.
    #[must_use]
    pub fn exchange_rate(&self) -> Option<Decimal> {
        if self.total_shares == 0 {
            return None;
        }
        let value = Decimal::try_from_i128_with_scale(i128::try_from(self.total_value).ok()?, 0).ok()?;
        let shares = Decimal::try_from_i128_with_scale(i128::try_from(self.total_shares).ok()?, 0).ok()?;
        value.checked_div(shares)
    }
}
