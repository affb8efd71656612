//! Token Ledger
//!
//! Account store and state-transition logic for a single-ledger fungible
//! token with delegated spending.
//!
//! Every operation runs in two phases. A `plan_*` function validates the
//! request against the current store and computes the complete post-state
//! of every touched record without mutating anything. Only a successful
//! plan reaches the commit step, which writes all records and the event
//! in one step. A rejected operation therefore leaves the store untouched.
//!
//! ## Delegation
//!
//! Approve escrows the allowance: the delegate's previous remaining
//! allowance is returned to the source, then `amount` moves from the
//! source into the delegate account. Spending from a delegate only debits
//! the delegate. Revoke returns the remaining escrow. The sum of all
//! balances of a mint always equals its total supply.

use std::collections::BTreeMap;

use tracing::{debug, warn};

pub mod codec;
pub mod host;


pub use ledger_common::{
    config::LedgerConfig,
    errors::{DelegateErrorReason, LedgerError, LedgerResult},
    events::{EventLog, EventType, LedgerEvent},
    types::{Account, AccountId, Address, Instruction, Mint, MintId, Outcome},
};

use ledger_common::{
    check,
    math::{credit, debit},
    types::{derive_account_id, derive_mint_id},
    validation::{
        balances_conserved, require_delegate_of, require_not_delegate, require_owner,
        require_same_mint, require_sufficient_funds, require_valid_address,
        validate_mint_params,
    },
};

// ============ Pending Changes ============

/// Fully computed effect of one operation, ready to commit
#[derive(Debug)]
struct Commit {
    mint: Option<Mint>,
    accounts: Vec<(AccountId, Account)>,
    ids_allocated: u64,
    event: LedgerEvent,
}

/// Post-state of an allowance change
struct AllowanceChange {
    source: Account,
    delegate: Account,
    refunded: u64,
}

// ============ Ledger ============

/// The account store and its operations
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    config: LedgerConfig,
    mints: BTreeMap<MintId, Mint>,
    accounts: BTreeMap<AccountId, Account>,
    /// Next id-derivation nonce
    nonce: u64,
    /// Number of committed operations
    sequence: u64,
    events: EventLog,
}

impl Ledger {
    /// Create an empty ledger with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger with custom limits
    pub fn with_config(config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    // -------- instruction interface --------

    /// Apply one instruction atomically
    pub fn execute(&mut self, instruction: Instruction) -> LedgerResult<Outcome> {
        let op = instruction.name();
        let signer = *instruction.signer();
        let result = match instruction {
            Instruction::CreateMint {
                authority,
                supply,
                decimals,
                name,
                symbol,
            } => self
                .create_mint(authority, supply, decimals, name, symbol)
                .map(|(mint, account)| Outcome::MintCreated { mint, account }),
            Instruction::CreateAccount {
                owner,
                mint,
                source,
            } => self
                .create_account(owner, mint, source)
                .map(|account| Outcome::AccountCreated { account }),
            Instruction::Transfer {
                authority,
                from,
                to,
                amount,
            } => self
                .transfer(authority, from, to, amount)
                .map(|()| Outcome::Applied),
            Instruction::Approve {
                authority,
                source,
                delegate,
                amount,
            } => self
                .approve(authority, source, delegate, amount)
                .map(|()| Outcome::Applied),
            Instruction::Revoke {
                authority,
                source,
                delegate,
            } => self
                .revoke(authority, source, delegate)
                .map(|()| Outcome::Applied),
            Instruction::SetOwner {
                authority,
                account,
                new_owner,
            } => self
                .set_owner(authority, account, new_owner)
                .map(|()| Outcome::Applied),
        };

        if let Err(err) = &result {
            warn!(
                instruction = op,
                signer = %hex::encode(signer),
                code = err.code(),
                %err,
                "instruction rejected"
            );
        }
        result
    }

    // -------- operations --------

    /// Create a mint and an initial account owned by `authority` holding
    /// the whole supply
    pub fn create_mint(
        &mut self,
        authority: Address,
        supply: u64,
        decimals: u8,
        name: String,
        symbol: String,
    ) -> LedgerResult<(MintId, AccountId)> {
        let (commit, ids) = self.plan_create_mint(authority, supply, decimals, name, symbol)?;
        self.commit(commit);
        Ok(ids)
    }

    /// Create an empty account, as a delegate of `source` when given
    pub fn create_account(
        &mut self,
        owner: Address,
        mint: MintId,
        source: Option<AccountId>,
    ) -> LedgerResult<AccountId> {
        let (commit, id) = self.plan_create_account(owner, mint, source)?;
        self.commit(commit);
        Ok(id)
    }

    /// Move `amount` from `from` to `to`, signed by the owner of `from`
    pub fn transfer(
        &mut self,
        authority: Address,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> LedgerResult<()> {
        let commit = self.plan_transfer(authority, from, to, amount)?;
        self.commit(commit);
        Ok(())
    }

    /// Grant `delegate` an allowance of `amount` drawn from `source`,
    /// replacing any previous allowance
    pub fn approve(
        &mut self,
        authority: Address,
        source: AccountId,
        delegate: AccountId,
        amount: u64,
    ) -> LedgerResult<()> {
        let change = self.plan_allowance(&authority, &source, &delegate, amount)?;
        let event = LedgerEvent::Approval {
            source,
            delegate,
            amount,
            refunded: change.refunded,
            sequence: self.sequence,
        };
        self.commit(Commit {
            mint: None,
            accounts: vec![(source, change.source), (delegate, change.delegate)],
            ids_allocated: 0,
            event,
        });
        Ok(())
    }

    /// Reset the allowance of `delegate` to zero, returning the remaining
    /// escrow to `source`
    pub fn revoke(
        &mut self,
        authority: Address,
        source: AccountId,
        delegate: AccountId,
    ) -> LedgerResult<()> {
        let change = self.plan_allowance(&authority, &source, &delegate, 0)?;
        let event = LedgerEvent::Revocation {
            source,
            delegate,
            refunded: change.refunded,
            sequence: self.sequence,
        };
        self.commit(Commit {
            mint: None,
            accounts: vec![(source, change.source), (delegate, change.delegate)],
            ids_allocated: 0,
            event,
        });
        Ok(())
    }

    /// Hand `account` over to `new_owner`
    pub fn set_owner(
        &mut self,
        authority: Address,
        account: AccountId,
        new_owner: Address,
    ) -> LedgerResult<()> {
        let commit = self.plan_set_owner(authority, account, new_owner)?;
        self.commit(commit);
        Ok(())
    }

    // -------- planning --------

    fn plan_create_mint(
        &self,
        authority: Address,
        supply: u64,
        decimals: u8,
        name: String,
        symbol: String,
    ) -> LedgerResult<(Commit, (MintId, AccountId))> {
        require_valid_address(&authority, "authority")?;
        validate_mint_params(&self.config, supply, decimals, &name, &symbol)?;

        let account_nonce = self.nonce.checked_add(1).ok_or(LedgerError::InvalidParameters {
            param: "nonce",
            reason: "id space exhausted",
        })?;
        let mint_id = derive_mint_id(&authority, self.nonce);
        let account_id = derive_account_id(&authority, account_nonce);
        check!(
            !self.mints.contains_key(&mint_id),
            LedgerError::InvalidParameters {
                param: "mint",
                reason: "already allocated",
            }
        );
        self.require_unallocated(&account_id)?;

        let mut account = Account::new(mint_id, authority);
        account.amount = supply;

        let commit = Commit {
            mint: Some(Mint {
                id: mint_id,
                total_supply: supply,
                decimals,
                name,
                symbol,
            }),
            accounts: vec![(account_id, account)],
            ids_allocated: 2,
            event: LedgerEvent::MintCreated {
                mint: mint_id,
                account: account_id,
                authority,
                total_supply: supply,
                decimals,
                sequence: self.sequence,
            },
        };
        Ok((commit, (mint_id, account_id)))
    }

    fn plan_create_account(
        &self,
        owner: Address,
        mint: MintId,
        source: Option<AccountId>,
    ) -> LedgerResult<(Commit, AccountId)> {
        require_valid_address(&owner, "owner")?;
        self.read_mint(&mint)?;

        let account = match source {
            None => Account::new(mint, owner),
            Some(source_id) => {
                let source_account = self.read_account(&source_id)?;
                require_same_mint(&mint, &source_account.mint)?;
                require_not_delegate(
                    &source_id,
                    source_account,
                    DelegateErrorReason::NestedDelegate,
                )?;
                Account::new_delegate(mint, owner, source_id)
            }
        };

        let account_id = derive_account_id(&owner, self.nonce);
        self.require_unallocated(&account_id)?;

        let commit = Commit {
            mint: None,
            accounts: vec![(account_id, account)],
            ids_allocated: 1,
            event: LedgerEvent::AccountCreated {
                account: account_id,
                mint,
                owner,
                source,
                sequence: self.sequence,
            },
        };
        Ok((commit, account_id))
    }

    fn plan_transfer(
        &self,
        authority: Address,
        from_id: AccountId,
        to_id: AccountId,
        amount: u64,
    ) -> LedgerResult<Commit> {
        let from = self.read_account(&from_id)?;
        let to = self.read_account(&to_id)?;

        require_owner(&from.owner, &authority)?;
        require_sufficient_funds(from.amount, amount)?;
        require_same_mint(&from.mint, &to.mint)?;
        require_not_delegate(&to_id, to, DelegateErrorReason::DelegateCannotReceive)?;

        // Moving funds onto the same account leaves its balance as is.
        let accounts = if from_id == to_id {
            Vec::new()
        } else {
            let mut new_from = from.clone();
            new_from.amount = debit(from.amount, amount)?;
            let mut new_to = to.clone();
            new_to.amount = credit(to.amount, amount)?;
            vec![(from_id, new_from), (to_id, new_to)]
        };

        Ok(Commit {
            mint: None,
            accounts,
            ids_allocated: 0,
            event: LedgerEvent::Transfer {
                from: from_id,
                to: to_id,
                amount,
                delegated: from.is_delegate(),
                sequence: self.sequence,
            },
        })
    }

    fn plan_allowance(
        &self,
        authority: &Address,
        source_id: &AccountId,
        delegate_id: &AccountId,
        amount: u64,
    ) -> LedgerResult<AllowanceChange> {
        let source = self.read_account(source_id)?;
        let delegate = self.read_account(delegate_id)?;

        require_owner(&source.owner, authority)?;
        require_delegate_of(delegate_id, delegate, source_id)?;
        require_same_mint(&source.mint, &delegate.mint)?;

        // Previous escrow goes back before the new allowance is taken.
        let refunded = delegate.amount;
        let available = credit(source.amount, refunded)?;

        let mut new_source = source.clone();
        new_source.amount = debit(available, amount)?;
        let mut new_delegate = delegate.clone();
        new_delegate.amount = amount;
        new_delegate.original_amount = amount;

        Ok(AllowanceChange {
            source: new_source,
            delegate: new_delegate,
            refunded,
        })
    }

    fn plan_set_owner(
        &self,
        authority: Address,
        account_id: AccountId,
        new_owner: Address,
    ) -> LedgerResult<Commit> {
        let account = self.read_account(&account_id)?;

        require_owner(&account.owner, &authority)?;
        require_valid_address(&new_owner, "new_owner")?;

        let mut updated = account.clone();
        updated.owner = new_owner;

        Ok(Commit {
            mint: None,
            accounts: vec![(account_id, updated)],
            ids_allocated: 0,
            event: LedgerEvent::OwnerChanged {
                account: account_id,
                old_owner: account.owner,
                new_owner,
                sequence: self.sequence,
            },
        })
    }

    fn require_unallocated(&self, account_id: &AccountId) -> LedgerResult<()> {
        check!(
            !self.accounts.contains_key(account_id),
            LedgerError::InvalidParameters {
                param: "account",
                reason: "already allocated",
            }
        );
        Ok(())
    }

    // -------- commit --------

    fn commit(&mut self, commit: Commit) {
        debug!(
            sequence = self.sequence,
            event = ?commit.event.event_type(),
            touched = commit.accounts.len(),
            "committing"
        );
        if let Some(mint) = commit.mint {
            self.mints.insert(mint.id, mint);
        }
        for (id, account) in commit.accounts {
            self.accounts.insert(id, account);
        }
        self.nonce = self.nonce.wrapping_add(commit.ids_allocated);
        self.sequence += 1;
        self.events.emit(commit.event);
    }

    // -------- read API --------

    /// Current state of an account
    pub fn read_account(&self, id: &AccountId) -> LedgerResult<&Account> {
        self.accounts
            .get(id)
            .ok_or_else(|| LedgerError::account_not_found(*id))
    }

    /// Current state of a mint
    pub fn read_mint(&self, id: &MintId) -> LedgerResult<&Mint> {
        self.mints
            .get(id)
            .ok_or_else(|| LedgerError::mint_not_found(*id))
    }

    /// All accounts of a mint
    pub fn accounts_of<'a>(
        &'a self,
        mint: &'a MintId,
    ) -> impl Iterator<Item = (&'a AccountId, &'a Account)> + 'a {
        self.accounts
            .iter()
            .filter(move |(_, account)| &account.mint == mint)
    }

    /// All delegate accounts created against `source`
    pub fn delegates_of<'a>(
        &'a self,
        source: &'a AccountId,
    ) -> impl Iterator<Item = (&'a AccountId, &'a Account)> + 'a {
        self.accounts
            .iter()
            .filter(move |(_, account)| account.is_delegate_of(source))
    }

    /// Sum of all balances of a mint
    pub fn circulating(&self, mint: &MintId) -> LedgerResult<u128> {
        self.read_mint(mint)?;
        Ok(ledger_common::math::sum_balances(
            self.accounts_of(mint).map(|(_, account)| account.amount),
        ))
    }

    /// Returns true if the balances of a mint add up to its total supply
    pub fn is_conserved(&self, mint: &MintId) -> LedgerResult<bool> {
        let mint_state = self.read_mint(mint)?;
        Ok(balances_conserved(
            mint_state.total_supply,
            self.accounts_of(mint).map(|(_, account)| account.amount),
        ))
    }

    /// Events of all committed operations not yet drained. The log keeps
    /// every event until [`Ledger::drain_events`] is called.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    /// Number of committed operations
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Number of mints in the store
    pub fn mint_count(&self) -> usize {
        self.mints.len()
    }

    /// Number of accounts in the store
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

// ============ Tests ============
