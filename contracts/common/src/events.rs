//! Ledger Events
//!
//! Every committed operation appends one event to the ledger's log. Events
//! carry the ledger sequence number of the operation that produced them and
//! can be serialized for off-ledger indexing.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, LedgerResult};
use crate::types::{AccountId, Address, MintId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Lifecycle Events (0x01 - 0x1F)
    MintCreated = 0x01,
    AccountCreated = 0x02,

    // Balance Events (0x20 - 0x3F)
    Transfer = 0x20,
    Approval = 0x21,
    Revocation = 0x22,

    // Authority Events (0x40 - 0x5F)
    OwnerChanged = 0x40,
}

/// Main event enum containing all ledger events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LedgerEvent {
    /// Emitted when a mint and its initial account are created
    MintCreated {
        mint: MintId,
        account: AccountId,
        authority: Address,
        total_supply: u64,
        decimals: u8,
        sequence: u64,
    },

    /// Emitted when an account is created
    AccountCreated {
        account: AccountId,
        mint: MintId,
        owner: Address,
        source: Option<AccountId>,
        sequence: u64,
    },

    /// Emitted on transfer, direct or delegated
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: u64,
        delegated: bool,
        sequence: u64,
    },

    /// Emitted when an allowance is granted
    Approval {
        source: AccountId,
        delegate: AccountId,
        amount: u64,
        refunded: u64,
        sequence: u64,
    },

    /// Emitted when an allowance is revoked
    Revocation {
        source: AccountId,
        delegate: AccountId,
        refunded: u64,
        sequence: u64,
    },

    /// Emitted when an account changes hands
    OwnerChanged {
        account: AccountId,
        old_owner: Address,
        new_owner: Address,
        sequence: u64,
    },
}

impl LedgerEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::MintCreated { .. } => EventType::MintCreated,
            Self::AccountCreated { .. } => EventType::AccountCreated,
            Self::Transfer { .. } => EventType::Transfer,
            Self::Approval { .. } => EventType::Approval,
            Self::Revocation { .. } => EventType::Revocation,
            Self::OwnerChanged { .. } => EventType::OwnerChanged,
        }
    }

    /// Sequence number of the operation that emitted this event
    pub fn sequence(&self) -> u64 {
        match self {
            Self::MintCreated { sequence, .. } => *sequence,
            Self::AccountCreated { sequence, .. } => *sequence,
            Self::Transfer { sequence, .. } => *sequence,
            Self::Approval { sequence, .. } => *sequence,
            Self::Revocation { sequence, .. } => *sequence,
            Self::OwnerChanged { sequence, .. } => *sequence,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> LedgerResult<Vec<u8>> {
        borsh::to_vec(self).map_err(|_| LedgerError::InvalidParameters {
            param: "event",
            reason: "encoding failed",
        })
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        borsh::from_slice(bytes).map_err(|_| LedgerError::InvalidParameters {
            param: "event",
            reason: "malformed bytes",
        })
    }
}

/// Event log for collecting events as operations commit
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&LedgerEvent> {
        self.events.last()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = LedgerEvent::Approval {
            source: [1u8; 32],
            delegate: [2u8; 32],
            amount: 2,
            refunded: 0,
            sequence: 7,
        };

        assert_eq!(event.event_type(), EventType::Approval);
        assert_eq!(event.sequence(), 7);
    }

    #[test]
    fn test_event_serialization() {
        let event = LedgerEvent::Transfer {
            from: [1u8; 32],
            to: [2u8; 32],
            amount: 100,
            delegated: true,
            sequence: 3,
        };

        let bytes = event.to_bytes().unwrap();
        assert!(!bytes.is_empty());
        let restored = LedgerEvent::from_bytes(&bytes).unwrap();

        assert_eq!(event, restored);
        assert_eq!(
            LedgerEvent::from_bytes(&[0xff]),
            Err(LedgerError::InvalidParameters {
                param: "event",
                reason: "malformed bytes"
            })
        );
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.emit(LedgerEvent::AccountCreated {
            account: [1u8; 32],
            mint: [2u8; 32],
            owner: [3u8; 32],
            source: None,
            sequence: 0,
        });
        log.emit(LedgerEvent::OwnerChanged {
            account: [1u8; 32],
            old_owner: [3u8; 32],
            new_owner: [4u8; 32],
            sequence: 1,
        });

        assert_eq!(log.len(), 2);
        assert!(!log.is_empty());
        assert_eq!(log.filter_by_type(EventType::OwnerChanged).len(), 1);
        assert_eq!(log.last().map(LedgerEvent::sequence), Some(1));

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }
}
