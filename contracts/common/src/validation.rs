//! Validation Helpers for the Token Ledger
//!
//! Authorization and invariant predicates evaluated before any mutation.
//! Each helper is a pure check returning the typed error on failure.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_common::validation::{check, require_owner, require_same_mint};
//!
//! require_owner(&account.owner, &signer)?;
//! require_same_mint(&from.mint, &to.mint)?;
//! check!(!to.is_delegate(), LedgerError::InvalidParameters { param: "to", reason: "delegate" });
//! ```

use crate::{
    config::LedgerConfig,
    constants::ids::ZERO_ADDRESS,
    errors::{DelegateErrorReason, LedgerError, LedgerResult},
    math::sum_balances,
    types::{Account, AccountId, Address, MintId},
};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// ```rust,ignore
/// check!(amount <= balance, LedgerError::InsufficientFunds { available: balance, requested: amount });
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

// ============ Authorization ============

/// Require the signer to be the current owner.
pub fn require_owner(owner: &Address, signer: &Address) -> LedgerResult<()> {
    check!(
        owner == signer,
        LedgerError::Unauthorized {
            expected: *owner,
            actual: *signer,
        }
    );
    Ok(())
}

/// Require an address to not be the reserved zero address.
pub fn require_valid_address(address: &Address, param: &'static str) -> LedgerResult<()> {
    check!(
        *address != ZERO_ADDRESS,
        LedgerError::InvalidParameters {
            param,
            reason: "zero address is reserved",
        }
    );
    Ok(())
}

// ============ Balances ============

/// Require sufficient balance for a debit.
pub fn require_sufficient_funds(available: u64, requested: u64) -> LedgerResult<()> {
    check!(
        available >= requested,
        LedgerError::InsufficientFunds {
            available,
            requested,
        }
    );
    Ok(())
}

/// Require two accounts to belong to the same mint.
pub fn require_same_mint(expected: &MintId, actual: &MintId) -> LedgerResult<()> {
    check!(
        expected == actual,
        LedgerError::MintMismatch {
            expected: *expected,
            actual: *actual,
        }
    );
    Ok(())
}

// ============ Delegation ============

/// Require `delegate` to be a delegate account created against `source`.
pub fn require_delegate_of(
    delegate_id: &AccountId,
    delegate: &Account,
    source_id: &AccountId,
) -> LedgerResult<()> {
    let reason = match &delegate.source {
        None => DelegateErrorReason::NotADelegate,
        Some(source) if source == source_id => return Ok(()),
        Some(_) => DelegateErrorReason::SourceMismatch,
    };
    Err(LedgerError::InvalidDelegate {
        account: *delegate_id,
        reason,
    })
}

/// Require an account to be a plain (non-delegate) account.
pub fn require_not_delegate(
    account_id: &AccountId,
    account: &Account,
    reason: DelegateErrorReason,
) -> LedgerResult<()> {
    check!(
        !account.is_delegate(),
        LedgerError::InvalidDelegate {
            account: *account_id,
            reason,
        }
    );
    Ok(())
}

// ============ Mint Parameters ============

/// Validate CreateMint arguments against the configured limits.
pub fn validate_mint_params(
    config: &LedgerConfig,
    supply: u64,
    decimals: u8,
    name: &str,
    symbol: &str,
) -> LedgerResult<()> {
    check!(
        decimals <= config.max_decimals,
        LedgerError::InvalidParameters {
            param: "decimals",
            reason: "exceeds maximum",
        }
    );
    check!(
        supply <= config.max_supply,
        LedgerError::InvalidParameters {
            param: "supply",
            reason: "exceeds maximum",
        }
    );
    check!(
        name.len() <= config.max_name_len,
        LedgerError::InvalidParameters {
            param: "name",
            reason: "too long",
        }
    );
    check!(
        !symbol.is_empty(),
        LedgerError::InvalidParameters {
            param: "symbol",
            reason: "must not be empty",
        }
    );
    check!(
        symbol.len() <= config.max_symbol_len,
        LedgerError::InvalidParameters {
            param: "symbol",
            reason: "too long",
        }
    );
    Ok(())
}

// ============ Conservation ============

/// Returns true if the balances of a mint add up to its supply.
pub fn balances_conserved<I>(total_supply: u64, balances: I) -> bool
where
    I: IntoIterator<Item = u64>,
{
    sum_balances(balances) == u128::from(total_supply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_owner() {
        let owner = [1u8; 32];
        let other = [2u8; 32];

        assert!(require_owner(&owner, &owner).is_ok());
        assert_eq!(
            require_owner(&owner, &other),
            Err(LedgerError::Unauthorized {
                expected: owner,
                actual: other
            })
        );
    }

    #[test]
    fn test_require_valid_address() {
        assert!(require_valid_address(&[1u8; 32], "owner").is_ok());
        assert!(require_valid_address(&ZERO_ADDRESS, "owner").is_err());
    }

    #[test]
    fn test_require_sufficient_funds() {
        assert!(require_sufficient_funds(10, 10).is_ok());
        assert!(require_sufficient_funds(10, 11).is_err());
    }

    #[test]
    fn test_require_delegate_of() {
        let source = [5u8; 32];
        let delegate_id = [6u8; 32];

        let delegate = Account::new_delegate([1u8; 32], [2u8; 32], source);
        assert!(require_delegate_of(&delegate_id, &delegate, &source).is_ok());
        assert_eq!(
            require_delegate_of(&delegate_id, &delegate, &[7u8; 32]),
            Err(LedgerError::InvalidDelegate {
                account: delegate_id,
                reason: DelegateErrorReason::SourceMismatch
            })
        );

        let plain = Account::new([1u8; 32], [2u8; 32]);
        assert_eq!(
            require_delegate_of(&delegate_id, &plain, &source),
            Err(LedgerError::InvalidDelegate {
                account: delegate_id,
                reason: DelegateErrorReason::NotADelegate
            })
        );
    }

    #[test]
    fn test_validate_mint_params() {
        let config = LedgerConfig::default();
        assert!(validate_mint_params(&config, 10_000, 2, "Test Token", "TEST").is_ok());
        assert!(validate_mint_params(&config, 10_000, 20, "Test Token", "TEST").is_err());
        assert!(validate_mint_params(&config, u64::MAX, 2, "Test Token", "TEST").is_err());
        assert!(validate_mint_params(&config, 10_000, 2, "Test Token", "").is_err());
        let long = "x".repeat(33);
        assert!(validate_mint_params(&config, 10_000, 2, &long, "TEST").is_err());
        assert!(validate_mint_params(&config, 10_000, 2, "Test Token", &long).is_err());
    }

    #[test]
    fn test_balances_conserved() {
        assert!(balances_conserved(600, [100, 200, 300]));
        assert!(!balances_conserved(600, [100, 200]));
        assert!(balances_conserved(0, Vec::<u64>::new()));
    }

    #[test]
    fn test_check_macro() {
        fn positive(value: u64) -> LedgerResult<()> {
            check!(
                value > 0,
                LedgerError::InvalidParameters {
                    param: "value",
                    reason: "zero"
                }
            );
            Ok(())
        }

        assert!(positive(1).is_ok());
        assert!(positive(0).is_err());
    }
}
