//! # sharepool-types
//!
//! Shared types, errors, and configuration for the **SharePool** ledger.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`]
//! - **Amounts**: [`Value`], [`Shares`], [`PoolSnapshot`]
//! - **Events**: [`PoolEvent`], [`PoolEventRecord`]
//! - **Receipts**: [`DepositReceipt`], [`WithdrawReceipt`]
//! - **Configuration**: [`PoolConfig`], [`DustPolicy`], [`ServiceConfig`], [`SharePoolConfig`]
//! - **Errors**: [`SharePoolError`] with `SP_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use sharepool_types::{AccountId, PoolEvent, SharePoolError, ...};

pub use balance::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use receipt::*;

// Constants are accessed via `sharepool_types::constants::FOO`
// (not re-exported to avoid name collisions).
