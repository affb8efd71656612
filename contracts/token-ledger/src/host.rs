//! Ledger Host
//!
//! The narrow interface through which instructions reach the ledger and
//! state is read back. [`InMemoryHost`] serializes all instructions through
//! one write lock, so each instruction observes every instruction ordered
//! before it and readers only ever see fully committed state.

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::{decode_instruction, LedgerSnapshot};
use crate::{
    Account, AccountId, Instruction, Ledger, LedgerConfig, LedgerEvent, LedgerResult, Mint,
    MintId, Outcome,
};

/// Submission and read path for a ledger
pub trait LedgerHost {
    /// Apply one instruction
    fn submit(&self, instruction: Instruction) -> LedgerResult<Outcome>;

    /// Decode a CBOR instruction and apply it
    fn submit_encoded(&self, bytes: &[u8]) -> LedgerResult<Outcome> {
        let instruction = decode_instruction(bytes)?;
        self.submit(instruction)
    }

    /// Current state of an account
    fn read_account(&self, id: &AccountId) -> LedgerResult<Account>;

    /// Current state of a mint
    fn read_mint(&self, id: &MintId) -> LedgerResult<Mint>;
}

/// Host keeping the ledger in process memory
///
/// Every committed instruction appends one event to the ledger's log, and
/// the log is only emptied by [`InMemoryHost::drain_events`]. A long-running
/// host must drain it periodically. Snapshots do not carry events.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    ledger: RwLock<Ledger>,
}

impl InMemoryHost {
    /// Host over an empty ledger with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Host over an empty ledger with custom limits
    pub fn with_config(config: LedgerConfig) -> LedgerResult<Self> {
        Ok(Self::from_ledger(Ledger::with_config(config)?))
    }

    /// Host over an existing ledger
    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(ledger),
        }
    }

    /// Restore a host from snapshot bytes
    pub fn restore(config: LedgerConfig, bytes: &[u8]) -> LedgerResult<Self> {
        let snapshot = LedgerSnapshot::from_bytes(bytes)?;
        let ledger = Ledger::from_snapshot(config, snapshot)?;
        debug!(
            mints = ledger.mint_count(),
            accounts = ledger.account_count(),
            "ledger restored"
        );
        Ok(Self::from_ledger(ledger))
    }

    /// Serialize the current store
    pub fn snapshot(&self) -> LedgerResult<Vec<u8>> {
        self.ledger.read().snapshot().to_bytes()
    }

    /// Take all events committed since the last drain, emptying the log
    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        self.ledger.write().drain_events()
    }

    /// Run a read-only closure against a consistent view of the ledger
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.ledger.read())
    }

    /// Consume the host and return the ledger
    pub fn into_inner(self) -> Ledger {
        self.ledger.into_inner()
    }
}

impl LedgerHost for InMemoryHost {
    fn submit(&self, instruction: Instruction) -> LedgerResult<Outcome> {
        self.ledger.write().execute(instruction)
    }

    fn read_account(&self, id: &AccountId) -> LedgerResult<Account> {
        self.ledger.read().read_account(id).cloned()
    }

    fn read_mint(&self, id: &MintId) -> LedgerResult<Mint> {
        self.ledger.read().read_mint(id).cloned()
    }
}
