//! # sharepool-ledger
//!
//! Proportional-share accounting for the **SharePool** value pool.
//!
//! Participants deposit value and receive shares at the current exchange
//! rate. An authorized operator injects rewards by raising the pool value
//! without minting shares, so every holder's redeemable balance grows in
//! proportion to their shares in O(1), whatever the participant count.
//!
//! - [`ShareLedger`]: the operation API (deposit, withdraw, reward, balance)
//! - [`LedgerState`]: per-participant shares and pool aggregates
//! - [`exchange_rate`]: overflow-safe share/value conversion
//! - [`ValueConservation`]: flow and claims audits
//! - [`AccessControl`], [`ValueCustody`], [`EventSink`]: collaborator seams
//!
//! ## Exchange Rate
//!
//! ```text
//! deposit:  minted = amount · total_shares / total_value   (1:1 when empty)
//! withdraw: payout = shares · total_value  / total_shares
//! reward:   total_value += amount                          (no shares minted)
//! ```
//!
//! Both conversions round toward zero, so any rounding residue stays in the
//! pool and the last holder to withdraw takes it with them.

pub mod access;
pub mod conservation;
pub mod custody;
pub mod exchange_rate;
pub mod ledger;
pub mod sink;
pub mod state;

pub use access::{AccessControl, SingleOperator};
pub use conservation::ValueConservation;
pub use custody::{InMemoryCustody, ValueCustody};
pub use ledger::ShareLedger;
pub use sink::{EventJournal, EventSink, FailingEventSink, TracingEventSink};
pub use state::LedgerState;
