//! Wire Codec for the Token Ledger
//!
//! Bridges external bytes and the ledger's typed interface.
//!
//! ## Instructions (CBOR)
//!
//! | Op   | Instruction   | `accounts`            | Other fields                 |
//! |------|---------------|-----------------------|------------------------------|
//! | 0x00 | CreateMint    | none                  | `amount`, `metadata`         |
//! | 0x01 | CreateAccount | `[source]` (optional) | `mint`                       |
//! | 0x02 | Transfer      | `[from, to]`          | `amount`                     |
//! | 0x03 | Approve       | `[source, delegate]`  | `amount`                     |
//! | 0x04 | Revoke        | `[source, delegate]`  |                              |
//! | 0x05 | SetOwner      | `[account]`           | `new_owner`                  |
//!
//! ## Snapshots (borsh)
//!
//! A [`LedgerSnapshot`] holds every mint and account plus the id nonce and
//! sequence counter. Restoring re-checks the store invariants, the mint
//! limits of the target config and the id nonce, so a damaged snapshot is
//! refused instead of loaded.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use ledger_common::{
    check,
    constants::ops::{
        OP_APPROVE, OP_CREATE_ACCOUNT, OP_CREATE_MINT, OP_REVOKE, OP_SET_OWNER, OP_TRANSFER,
    },
    validation::{balances_conserved, require_valid_address, validate_mint_params},
};

use crate::{
    Account, AccountId, Address, EventLog, Instruction, Ledger, LedgerConfig, LedgerError,
    LedgerResult, Mint, MintId,
};

// ============ Instruction Envelope ============

/// Mint metadata carried by CreateMint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintMetadata {
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
}

/// Serialized form of an [`Instruction`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionEnvelope {
    pub op: u8,
    /// Signing identity
    pub signer: Address,
    /// Positional account references, see the module table
    pub accounts: Vec<AccountId>,
    pub mint: Option<MintId>,
    pub new_owner: Option<Address>,
    pub amount: u64,
    pub metadata: Option<MintMetadata>,
}

impl InstructionEnvelope {
    fn bare(op: u8, signer: Address) -> Self {
        Self {
            op,
            signer,
            accounts: Vec::new(),
            mint: None,
            new_owner: None,
            amount: 0,
            metadata: None,
        }
    }

    fn account(&self, index: usize) -> LedgerResult<AccountId> {
        self.accounts
            .get(index)
            .copied()
            .ok_or(LedgerError::InvalidParameters {
                param: "accounts",
                reason: "missing account reference",
            })
    }

    fn expect_accounts(&self, count: usize) -> LedgerResult<()> {
        check!(
            self.accounts.len() == count,
            LedgerError::InvalidParameters {
                param: "accounts",
                reason: "unexpected number of account references",
            }
        );
        Ok(())
    }
}

impl From<&Instruction> for InstructionEnvelope {
    fn from(instruction: &Instruction) -> Self {
        match instruction {
            Instruction::CreateMint {
                authority,
                supply,
                decimals,
                name,
                symbol,
            } => Self {
                amount: *supply,
                metadata: Some(MintMetadata {
                    decimals: *decimals,
                    name: name.clone(),
                    symbol: symbol.clone(),
                }),
                ..Self::bare(OP_CREATE_MINT, *authority)
            },
            Instruction::CreateAccount {
                owner,
                mint,
                source,
            } => Self {
                accounts: source.iter().copied().collect(),
                mint: Some(*mint),
                ..Self::bare(OP_CREATE_ACCOUNT, *owner)
            },
            Instruction::Transfer {
                authority,
                from,
                to,
                amount,
            } => Self {
                accounts: vec![*from, *to],
                amount: *amount,
                ..Self::bare(OP_TRANSFER, *authority)
            },
            Instruction::Approve {
                authority,
                source,
                delegate,
                amount,
            } => Self {
                accounts: vec![*source, *delegate],
                amount: *amount,
                ..Self::bare(OP_APPROVE, *authority)
            },
            Instruction::Revoke {
                authority,
                source,
                delegate,
            } => Self {
                accounts: vec![*source, *delegate],
                ..Self::bare(OP_REVOKE, *authority)
            },
            Instruction::SetOwner {
                authority,
                account,
                new_owner,
            } => Self {
                accounts: vec![*account],
                new_owner: Some(*new_owner),
                ..Self::bare(OP_SET_OWNER, *authority)
            },
        }
    }
}

impl TryFrom<InstructionEnvelope> for Instruction {
    type Error = LedgerError;

    fn try_from(envelope: InstructionEnvelope) -> LedgerResult<Self> {
        let signer = envelope.signer;
        match envelope.op {
            OP_CREATE_MINT => {
                envelope.expect_accounts(0)?;
                let metadata = envelope.metadata.ok_or(LedgerError::InvalidParameters {
                    param: "metadata",
                    reason: "required for CreateMint",
                })?;
                Ok(Instruction::CreateMint {
                    authority: signer,
                    supply: envelope.amount,
                    decimals: metadata.decimals,
                    name: metadata.name,
                    symbol: metadata.symbol,
                })
            }
            OP_CREATE_ACCOUNT => {
                check!(
                    envelope.accounts.len() <= 1,
                    LedgerError::InvalidParameters {
                        param: "accounts",
                        reason: "unexpected number of account references",
                    }
                );
                let mint = envelope.mint.ok_or(LedgerError::InvalidParameters {
                    param: "mint",
                    reason: "required for CreateAccount",
                })?;
                Ok(Instruction::CreateAccount {
                    owner: signer,
                    mint,
                    source: envelope.accounts.first().copied(),
                })
            }
            OP_TRANSFER => {
                envelope.expect_accounts(2)?;
                Ok(Instruction::Transfer {
                    authority: signer,
                    from: envelope.account(0)?,
                    to: envelope.account(1)?,
                    amount: envelope.amount,
                })
            }
            OP_APPROVE => {
                envelope.expect_accounts(2)?;
                Ok(Instruction::Approve {
                    authority: signer,
                    source: envelope.account(0)?,
                    delegate: envelope.account(1)?,
                    amount: envelope.amount,
                })
            }
            OP_REVOKE => {
                envelope.expect_accounts(2)?;
                Ok(Instruction::Revoke {
                    authority: signer,
                    source: envelope.account(0)?,
                    delegate: envelope.account(1)?,
                })
            }
            OP_SET_OWNER => {
                envelope.expect_accounts(1)?;
                let new_owner = envelope.new_owner.ok_or(LedgerError::InvalidParameters {
                    param: "new_owner",
                    reason: "required for SetOwner",
                })?;
                Ok(Instruction::SetOwner {
                    authority: signer,
                    account: envelope.account(0)?,
                    new_owner,
                })
            }
            _ => Err(LedgerError::InvalidParameters {
                param: "op",
                reason: "unknown instruction",
            }),
        }
    }
}

/// Encode an instruction as CBOR
pub fn encode_instruction(instruction: &Instruction) -> LedgerResult<Vec<u8>> {
    let envelope = InstructionEnvelope::from(instruction);
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&envelope, &mut bytes).map_err(|_| {
        LedgerError::InvalidParameters {
            param: "instruction",
            reason: "CBOR encoding failed",
        }
    })?;
    Ok(bytes)
}

/// Decode a CBOR instruction
pub fn decode_instruction(bytes: &[u8]) -> LedgerResult<Instruction> {
    let envelope: InstructionEnvelope =
        ciborium::de::from_reader(bytes).map_err(|_| LedgerError::InvalidParameters {
            param: "instruction",
            reason: "malformed CBOR",
        })?;
    Instruction::try_from(envelope)
}

// ============ Snapshots ============

/// Persistable image of the account store
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LedgerSnapshot {
    pub mints: Vec<Mint>,
    pub accounts: Vec<(AccountId, Account)>,
    pub nonce: u64,
    pub sequence: u64,
}

impl LedgerSnapshot {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> LedgerResult<Vec<u8>> {
        borsh::to_vec(self).map_err(|_| LedgerError::InvalidParameters {
            param: "snapshot",
            reason: "encoding failed",
        })
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        borsh::from_slice(bytes).map_err(|_| LedgerError::InvalidParameters {
            param: "snapshot",
            reason: "malformed bytes",
        })
    }
}

fn corrupt(reason: &'static str) -> LedgerError {
    LedgerError::InvalidParameters {
        param: "snapshot",
        reason,
    }
}

impl Ledger {
    /// Capture the store. Pending events are not part of the image.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            mints: self.mints.values().cloned().collect(),
            accounts: self
                .accounts
                .iter()
                .map(|(id, account)| (*id, account.clone()))
                .collect(),
            nonce: self.nonce,
            sequence: self.sequence,
        }
    }

    /// Rebuild a ledger from a snapshot, refusing one that breaks the
    /// store invariants
    pub fn from_snapshot(config: LedgerConfig, snapshot: LedgerSnapshot) -> LedgerResult<Self> {
        config.validate()?;

        let mut mints = BTreeMap::new();
        for mint in snapshot.mints {
            validate_mint_params(
                &config,
                mint.total_supply,
                mint.decimals,
                &mint.name,
                &mint.symbol,
            )
            .map_err(|_| corrupt("mint parameters out of range"))?;
            if mints.insert(mint.id, mint).is_some() {
                return Err(corrupt("duplicate mint"));
            }
        }
        let mut accounts = BTreeMap::new();
        for (id, account) in snapshot.accounts {
            if accounts.insert(id, account).is_some() {
                return Err(corrupt("duplicate account"));
            }
        }

        for (id, account) in &accounts {
            check!(
                mints.contains_key(&account.mint),
                corrupt("account references unknown mint")
            );
            require_valid_address(&account.owner, "owner")
                .map_err(|_| corrupt("account owned by the zero address"))?;
            match &account.source {
                None => check!(
                    account.original_amount == 0,
                    corrupt("allowance on a plain account")
                ),
                Some(source_id) => {
                    check!(source_id != id, corrupt("account delegates to itself"));
                    let source: &Account = accounts
                        .get(source_id)
                        .ok_or_else(|| corrupt("delegate references unknown source"))?;
                    check!(!source.is_delegate(), corrupt("nested delegate"));
                    check!(source.mint == account.mint, corrupt("delegate mint mismatch"));
                    check!(
                        account.amount <= account.original_amount,
                        corrupt("allowance exceeds ceiling")
                    );
                }
            }
        }

        for mint in mints.values() {
            let balances = accounts
                .values()
                .filter(|account| account.mint == mint.id)
                .map(|account| account.amount);
            check!(
                balances_conserved(mint.total_supply, balances),
                corrupt("balances do not match supply")
            );
        }

        // CreateMint allocates two ids and CreateAccount one, so the nonce
        // always equals the number of stored records.
        let allocated = (mints.len() + accounts.len()) as u64;
        check!(
            snapshot.nonce == allocated,
            corrupt("nonce does not match allocated ids")
        );

        Ok(Self {
            config,
            mints,
            accounts,
            nonce: snapshot.nonce,
            sequence: snapshot.sequence,
            events: EventLog::new(),
        })
    }
}
