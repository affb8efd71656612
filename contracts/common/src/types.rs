//! Core Types for the Token Ledger
//!
//! Data model shared by the ledger store, the wire codec and the host:
//! identifiers, [`Mint`], [`Account`], and the [`Instruction`] set.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::ids;

/// Type alias for identities (32-byte public key hash)
pub type Address = [u8; 32];

/// Type alias for mint identifiers
pub type MintId = [u8; 32];

/// Type alias for account identifiers
pub type AccountId = [u8; 32];

// ============ Mint ============

/// A fungible token type and its fixed metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Mint {
    /// Unique identifier for this token type
    pub id: MintId,
    /// Total supply, fixed at creation
    pub total_supply: u64,
    /// Number of base 10 digits to the right of the decimal point
    pub decimals: u8,
    /// Descriptive name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
}

// ============ Account ============

/// A balance record under one mint, owned by one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Account {
    /// Mint this account holds tokens of
    pub mint: MintId,
    /// Identity authorized to spend and manage this account
    pub owner: Address,
    /// Current balance. For a delegate this is the remaining allowance.
    pub amount: u64,
    /// Allowance ceiling granted by the most recent Approve (delegates only)
    pub original_amount: u64,
    /// Source account, present iff this is a delegate account
    pub source: Option<AccountId>,
}

impl Account {
    /// New empty plain account
    pub fn new(mint: MintId, owner: Address) -> Self {
        Self {
            mint,
            owner,
            amount: 0,
            original_amount: 0,
            source: None,
        }
    }

    /// New empty delegate account drawing from `source`
    pub fn new_delegate(mint: MintId, owner: Address, source: AccountId) -> Self {
        Self {
            source: Some(source),
            ..Self::new(mint, owner)
        }
    }

    /// Returns true if this account is a delegate of some source
    pub fn is_delegate(&self) -> bool {
        self.source.is_some()
    }

    /// Returns true if this account is a delegate of `source`
    pub fn is_delegate_of(&self, source: &AccountId) -> bool {
        self.source.as_ref() == Some(source)
    }
}

// ============ Instructions ============

/// One ledger operation, carrying its signer and references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum Instruction {
    /// Create a mint and an initial account holding the full supply
    CreateMint {
        authority: Address,
        supply: u64,
        decimals: u8,
        name: String,
        symbol: String,
    },
    /// Create an empty account, optionally as a delegate of `source`
    CreateAccount {
        owner: Address,
        mint: MintId,
        source: Option<AccountId>,
    },
    /// Move `amount` from `from` to `to`
    Transfer {
        authority: Address,
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
    /// Set the allowance of `delegate` against `source`
    Approve {
        authority: Address,
        source: AccountId,
        delegate: AccountId,
        amount: u64,
    },
    /// Reset the allowance of `delegate` to zero
    Revoke {
        authority: Address,
        source: AccountId,
        delegate: AccountId,
    },
    /// Hand `account` over to `new_owner`
    SetOwner {
        authority: Address,
        account: AccountId,
        new_owner: Address,
    },
}

impl Instruction {
    /// Identity that signed this instruction
    pub fn signer(&self) -> &Address {
        match self {
            Self::CreateMint { authority, .. } => authority,
            Self::CreateAccount { owner, .. } => owner,
            Self::Transfer { authority, .. } => authority,
            Self::Approve { authority, .. } => authority,
            Self::Revoke { authority, .. } => authority,
            Self::SetOwner { authority, .. } => authority,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateMint { .. } => "CreateMint",
            Self::CreateAccount { .. } => "CreateAccount",
            Self::Transfer { .. } => "Transfer",
            Self::Approve { .. } => "Approve",
            Self::Revoke { .. } => "Revoke",
            Self::SetOwner { .. } => "SetOwner",
        }
    }
}

/// Successful result of an [`Instruction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// CreateMint allocated a mint and its initial account
    MintCreated { mint: MintId, account: AccountId },
    /// CreateAccount allocated an account
    AccountCreated { account: AccountId },
    /// A balance or ownership mutation was committed
    Applied,
}

// ============ Identifier Derivation ============

/// Derive a deterministic mint id
pub fn derive_mint_id(authority: &Address, nonce: u64) -> MintId {
    derive_id(ids::MINT_DOMAIN, authority, nonce)
}

/// Derive a deterministic account id
pub fn derive_account_id(owner: &Address, nonce: u64) -> AccountId {
    derive_id(ids::ACCOUNT_DOMAIN, owner, nonce)
}

fn derive_id(domain: &[u8], creator: &Address, nonce: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(creator);
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&digest);
    id
}
