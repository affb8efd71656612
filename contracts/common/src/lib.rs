//! Token Ledger Common Library
//!
//! Shared types, constants, and utilities for the token ledger.
//!
//! ## Model
//!
//! - **Mint**: one fungible token type with fixed supply and metadata
//! - **Account**: a balance under one mint, owned by one identity
//! - **Delegate account**: an account that spends an allowance escrowed
//!   from exactly one source account (single level, never rebound)
//!
//! The ledger itself lives in the `token-ledger` crate. This crate holds
//! everything the ledger, its codec and its host agree on: identifiers,
//! the instruction set, the error taxonomy, validation predicates and
//! the event log.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use config::LedgerConfig;
pub use constants::*;
pub use errors::*;
pub use events::*;
pub use types::*;
