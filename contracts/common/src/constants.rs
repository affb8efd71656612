//! Ledger Constants
//!
//! Fixed limits and wire values shared by every ledger component.
//! Runtime-tunable limits start from these values through
//! [`LedgerConfig::default`](crate::config::LedgerConfig).

/// Mint Metadata Limits
pub mod mint {
    /// Largest accepted `decimals`. One whole token is `10^decimals` base
    /// units and `10^19` is the largest power of ten that fits in `u64`.
    pub const MAX_DECIMALS: u8 = 19;

    /// Largest supply accepted by CreateMint
    pub const MAX_SUPPLY: u64 = i64::MAX as u64;

    /// Maximum name length in bytes
    pub const MAX_NAME_LEN: usize = 32;

    /// Maximum symbol length in bytes
    pub const MAX_SYMBOL_LEN: usize = 32;
}

/// Identifier Derivation
pub mod ids {
    /// Domain tag mixed into mint id derivation
    pub const MINT_DOMAIN: &[u8] = b"token-ledger/mint";

    /// Domain tag mixed into account id derivation
    pub const ACCOUNT_DOMAIN: &[u8] = b"token-ledger/account";

    /// Reserved address, never a valid owner
    pub const ZERO_ADDRESS: [u8; 32] = [0u8; 32];
}

/// Instruction op codes used by the wire envelope
pub mod ops {
    pub const OP_CREATE_MINT: u8 = 0x00;
    pub const OP_CREATE_ACCOUNT: u8 = 0x01;
    pub const OP_TRANSFER: u8 = 0x02;
    pub const OP_APPROVE: u8 = 0x03;
    pub const OP_REVOKE: u8 = 0x04;
    pub const OP_SET_OWNER: u8 = 0x05;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_decimals_fits_u64() {
        let one = 10u64.checked_pow(mint::MAX_DECIMALS as u32);
        assert!(one.is_some());
        assert!(10u64.checked_pow(mint::MAX_DECIMALS as u32 + 1).is_none());
    }

    #[test]
    fn test_op_codes_unique() {
        let codes = [
            ops::OP_CREATE_MINT,
            ops::OP_CREATE_ACCOUNT,
            ops::OP_TRANSFER,
            ops::OP_APPROVE,
            ops::OP_REVOKE,
            ops::OP_SET_OWNER,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
