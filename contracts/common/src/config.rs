//! Runtime ledger configuration
//!
//! Limits enforced by CreateMint. Defaults come from [`crate::constants`];
//! a host can tighten them (never loosen past the arithmetic bounds).

use crate::constants::mint;
use crate::errors::{LedgerError, LedgerResult};

/// Limits applied when creating mints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Largest accepted `decimals`
    pub max_decimals: u8,
    /// Largest accepted initial supply
    pub max_supply: u64,
    /// Maximum name length in bytes
    pub max_name_len: usize,
    /// Maximum symbol length in bytes
    pub max_symbol_len: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_decimals: mint::MAX_DECIMALS,
            max_supply: mint::MAX_SUPPLY,
            max_name_len: mint::MAX_NAME_LEN,
            max_symbol_len: mint::MAX_SYMBOL_LEN,
        }
    }
}

impl LedgerConfig {
    /// Check that the configuration stays inside the hard limits
    pub fn validate(&self) -> LedgerResult<()> {
        if self.max_decimals > mint::MAX_DECIMALS {
            return Err(LedgerError::InvalidParameters {
                param: "max_decimals",
                reason: "exceeds hard limit",
            });
        }
        if self.max_supply > mint::MAX_SUPPLY {
            return Err(LedgerError::InvalidParameters {
                param: "max_supply",
                reason: "exceeds hard limit",
            });
        }
        if self.max_symbol_len == 0 {
            return Err(LedgerError::InvalidParameters {
                param: "max_symbol_len",
                reason: "must allow at least one byte",
            });
        }
        Ok(())
    }
}
