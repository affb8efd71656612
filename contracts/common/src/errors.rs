//! Error Types for the Token Ledger
//!
//! Every rejected operation surfaces one of these typed errors. Validation
//! failures never leave partial state behind, so callers can treat any
//! error as "nothing happened".

use core::fmt;

use crate::types::{AccountId, Address, MintId};

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Main error enum for all ledger errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ============ Authorization Errors ============
    /// Caller is not the owner required to authorize this operation
    Unauthorized { expected: Address, actual: Address },

    // ============ Balance Errors ============
    /// Debit would take a balance below zero
    InsufficientFunds { available: u64, requested: u64 },

    // ============ Relationship Errors ============
    /// Delegate account does not match the claimed source relationship
    InvalidDelegate {
        account: AccountId,
        reason: DelegateErrorReason,
    },

    /// Two accounts in one operation belong to different mints
    MintMismatch { expected: MintId, actual: MintId },

    // ============ Input Validation Errors ============
    /// Malformed or out-of-range arguments
    InvalidParameters { param: &'static str, reason: &'static str },

    // ============ Store Errors ============
    /// Referenced mint or account does not exist
    NotFound { kind: EntityKind, id: [u8; 32] },
}

/// Reasons for delegate relationship errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateErrorReason {
    /// Account is not a delegate account
    NotADelegate,
    /// Delegate was created against a different source
    SourceMismatch,
    /// Source of a new delegate is itself a delegate
    NestedDelegate,
    /// Delegate accounts only receive funds through Approve
    DelegateCannotReceive,
}

/// Kind of store entity referenced by [`LedgerError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Mint,
    Account,
}

impl LedgerError {
    /// Shorthand for a missing account
    pub fn account_not_found(id: AccountId) -> Self {
        Self::NotFound {
            kind: EntityKind::Account,
            id,
        }
    }

    /// Shorthand for a missing mint
    pub fn mint_not_found(id: MintId) -> Self {
        Self::NotFound {
            kind: EntityKind::Mint,
            id,
        }
    }

    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "E001_UNAUTHORIZED",
            Self::InsufficientFunds { .. } => "E010_INSUFFICIENT_FUNDS",
            Self::InvalidDelegate { .. } => "E020_INVALID_DELEGATE",
            Self::MintMismatch { .. } => "E021_MINT_MISMATCH",
            Self::InvalidParameters { .. } => "E030_INVALID_PARAMETERS",
            Self::NotFound { .. } => "E040_NOT_FOUND",
        }
    }

    /// Returns true if the caller can fix the cause and resubmit
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }
}

impl fmt::Display for DelegateErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotADelegate => "account is not a delegate",
            Self::SourceMismatch => "delegate belongs to another source",
            Self::NestedDelegate => "source is itself a delegate",
            Self::DelegateCannotReceive => "delegate accounts cannot receive transfers",
        };
        f.write_str(text)
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { expected, actual } => write!(
                f,
                "unauthorized: expected {}, got {}",
                hex::encode(expected),
                hex::encode(actual)
            ),
            Self::InsufficientFunds {
                available,
                requested,
            } => write!(
                f,
                "insufficient funds: {requested} requested, {available} available"
            ),
            Self::InvalidDelegate { account, reason } => {
                write!(f, "invalid delegate {}: {reason}", hex::encode(account))
            }
            Self::MintMismatch { expected, actual } => write!(
                f,
                "mint mismatch: expected {}, got {}",
                hex::encode(expected),
                hex::encode(actual)
            ),
            Self::InvalidParameters { param, reason } => {
                write!(f, "invalid parameter `{param}`: {reason}")
            }
            Self::NotFound { kind, id } => {
                write!(f, "{kind:?} {} not found", hex::encode(id))
            }
        }
    }
}

impl std::error::Error for LedgerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            LedgerError::Unauthorized {
                expected: [1u8; 32],
                actual: [2u8; 32],
            },
            LedgerError::InsufficientFunds {
                available: 1,
                requested: 2,
            },
            LedgerError::InvalidDelegate {
                account: [3u8; 32],
                reason: DelegateErrorReason::NotADelegate,
            },
            LedgerError::MintMismatch {
                expected: [4u8; 32],
                actual: [5u8; 32],
            },
            LedgerError::InvalidParameters {
                param: "decimals",
                reason: "too large",
            },
            LedgerError::account_not_found([6u8; 32]),
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_display_includes_context() {
        let err = LedgerError::InsufficientFunds {
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: 1 requested, 0 available"
        );

        let err = LedgerError::mint_not_found([0xab; 32]);
        assert!(err.to_string().starts_with("Mint abab"));
    }

    #[test]
    fn test_only_funds_errors_recoverable() {
        assert!(LedgerError::InsufficientFunds {
            available: 0,
            requested: 1
        }
        .is_recoverable());
        assert!(!LedgerError::Unauthorized {
            expected: [1u8; 32],
            actual: [2u8; 32]
        }
        .is_recoverable());
    }
}
