//! Exchange-rate engine: conversion between value and shares.
//!
//! Pure functions over a snapshot of the two pool aggregates. Every
//! conversion multiplies before it divides and rounds down, so rounding
//! loss always stays in the pool:
//!
//! ```text
//! shares_for_deposit(a) = a                        if total_shares == 0
//!                       = ⌊a · total_shares / total_value⌋
//! value_for_shares(s)   = 0                        if total_shares == 0
//!                       = ⌊s · total_value / total_shares⌋
//! ```
//!
//! Products are computed in `u128` when they fit and in arbitrary precision
//! otherwise, so no intermediate result can overflow.

use num_bigint::BigUint;
use rust_decimal::Decimal;
use sharepool_types::{PoolSnapshot, Result, SharePoolError, Shares, Value};

/// `⌊a · b / d⌋` at full precision. Returns `None` if `d == 0` or the
/// quotient does not fit in `u128`.
#[must_use]
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }
    let quotient = BigUint::from(a) * BigUint::from(b) / BigUint::from(d);
    u128::try_from(quotient).ok()
}

/// Shares to mint for a deposit of `amount` at the current rate.
///
/// An empty pool (`total_shares == 0`) mints 1:1 regardless of any stale
/// `total_value` left behind as dust.
///
/// # Errors
/// [`SharePoolError::ArithmeticOverflow`] if the pool holds shares but no
/// value, or if the share count would not fit in 128 bits.
pub fn shares_for_deposit(amount: Value, total_shares: Shares, total_value: Value) -> Result<Shares> {
    if total_shares == 0 {
        return Ok(amount);
    }
    mul_div(amount, total_shares, total_value).ok_or(SharePoolError::ArithmeticOverflow {
        operation: "shares_for_deposit",
    })
}

/// Value redeemable for `shares` at the current rate. Used for both
/// withdrawal payouts and balance queries.
///
/// # Errors
/// [`SharePoolError::ArithmeticOverflow`] only when `shares > total_shares`
/// pushes the result past 128 bits; ledger callers never pass such input.
pub fn value_for_shares(shares: Shares, total_shares: Shares, total_value: Value) -> Result<Value> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div(shares, total_value, total_shares).ok_or(SharePoolError::ArithmeticOverflow {
        operation: "value_for_shares",
    })
}

/// Value per share for reporting, `None` for an empty pool.
#[must_use]
pub fn exchange_rate(total_shares: Shares, total_value: Value) -> Option<Decimal> {
    PoolSnapshot {
        total_shares,
        total_value,
        ..PoolSnapshot::default()
    }
    .exchange_rate()
}
