//! Balance Arithmetic
//!
//! Checked debit/credit helpers. Nothing here wraps or saturates: a debit
//! past zero is `InsufficientFunds`, a credit past `u64::MAX` is rejected
//! as an invalid amount.

use crate::errors::{LedgerError, LedgerResult};

/// Subtract `amount` from `balance`
pub fn debit(balance: u64, amount: u64) -> LedgerResult<u64> {
    balance
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientFunds {
            available: balance,
            requested: amount,
        })
}

/// Add `amount` to `balance`
pub fn credit(balance: u64, amount: u64) -> LedgerResult<u64> {
    balance
        .checked_add(amount)
        .ok_or(LedgerError::InvalidParameters {
            param: "amount",
            reason: "balance overflow",
        })
}

/// Sum balances without overflow
///
/// Uses `u128` so that an audit over a corrupted store still reports the
/// true total instead of failing.
pub fn sum_balances<I>(balances: I) -> u128
where
    I: IntoIterator<Item = u64>,
{
    balances.into_iter().map(u128::from).sum()
}
