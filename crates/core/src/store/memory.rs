//! In-memory reference implementation of [`LedgerStore`].
//!
//! A single mutex plays the role the transactional database plays in
//! production: every store operation runs under the lock, so sequence
//! increments and posting commits are atomic with respect to each other.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tally_shared::config::LedgerConfig;
use tally_shared::types::{AccountId, EntryId, JournalId};

use super::{AccountInfo, LedgerStore};
use crate::ledger::balance::{AccountBalance, BalanceChange};
use crate::ledger::entry::LedgerEntry;
use crate::ledger::error::LedgerError;
use crate::ledger::sequence::{compose_number, Journal, SequenceKey};
use crate::ledger::types::{EntryKind, EntryStatus};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<EntryId, LedgerEntry>,
    numbers: HashSet<String>,
    accounts: HashMap<AccountId, AccountInfo>,
    balances: HashMap<AccountId, AccountBalance>,
    journals: HashMap<JournalId, Journal>,
    sequences: HashMap<SequenceKey, i64>,
}

/// In-memory ledger store.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    inner: Arc<Mutex<Inner>>,
    sequence_padding: u32,
    include_year_in_entry_numbers: bool,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// Creates an empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&LedgerConfig::default())
    }

    /// Creates an empty store using the given ledger configuration.
    #[must_use]
    pub fn with_config(config: &LedgerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            sequence_padding: config.sequence_padding,
            include_year_in_entry_numbers: config.include_year_in_entry_numbers,
        }
    }

    /// Registers an account.
    pub fn add_account(&self, info: AccountInfo) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        inner.balances.insert(info.id, AccountBalance::new(info.id));
        inner.accounts.insert(info.id, info);
        Ok(())
    }

    /// Registers a journal.
    pub fn add_journal(&self, journal: Journal) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        inner.journals.insert(journal.id, journal);
        Ok(())
    }

    /// Loads a journal snapshot (counter included).
    pub fn journal(&self, id: JournalId) -> Result<Journal, LedgerError> {
        let inner = self.lock()?;
        inner
            .journals
            .get(&id)
            .cloned()
            .ok_or(LedgerError::JournalNotFound(id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, LedgerError> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Storage("ledger store lock poisoned".to_string()))
    }

    fn apply_changes(
        balances: &mut HashMap<AccountId, AccountBalance>,
        changes: &[BalanceChange],
    ) -> Result<(), LedgerError> {
        // Validate every account first so a failure leaves nothing applied.
        for change in changes {
            if !balances.contains_key(&change.account_id) {
                return Err(LedgerError::AccountNotFound(change.account_id));
            }
        }
        for change in changes {
            if let Some(balance) = balances.get_mut(&change.account_id) {
                balance.apply(change.debit, change.credit);
            }
        }
        Ok(())
    }
}

impl LedgerStore for MemoryLedger {
    fn entry(&self, id: EntryId) -> Result<LedgerEntry, LedgerError> {
        let inner = self.lock()?;
        inner
            .entries
            .get(&id)
            .cloned()
            .ok_or(LedgerError::EntryNotFound(id))
    }

    fn entry_by_number(&self, number: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        let inner = self.lock()?;
        Ok(inner
            .entries
            .values()
            .find(|entry| entry.number == number)
            .cloned())
    }

    fn insert_entry(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        if inner.numbers.contains(&entry.number) {
            return Err(LedgerError::DuplicateNumber(entry.number));
        }
        inner.numbers.insert(entry.number.clone());
        inner.entries.insert(entry.id, entry);
        Ok(())
    }

    fn update_entry(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        if !inner.entries.contains_key(&entry.id) {
            return Err(LedgerError::EntryNotFound(entry.id));
        }
        inner.entries.insert(entry.id, entry);
        Ok(())
    }

    fn delete_entry(&self, id: EntryId) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        let entry = inner
            .entries
            .remove(&id)
            .ok_or(LedgerError::EntryNotFound(id))?;
        // Lines are owned by the entry, so removing it removes them too.
        inner.numbers.remove(&entry.number);
        Ok(())
    }

    fn number_exists(&self, number: &str) -> Result<bool, LedgerError> {
        let inner = self.lock()?;
        Ok(inner.numbers.contains(number))
    }

    fn account(&self, id: AccountId) -> Result<AccountInfo, LedgerError> {
        let inner = self.lock()?;
        inner
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    fn account_balance(&self, id: AccountId) -> Result<AccountBalance, LedgerError> {
        let inner = self.lock()?;
        inner
            .balances
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    fn allocate_entry_number(&self, kind: EntryKind, year: i32) -> Result<String, LedgerError> {
        let mut inner = self.lock()?;
        let key = SequenceKey::for_kind(kind, self.include_year_in_entry_numbers.then_some(year));
        let counter = inner.sequences.entry(key.clone()).or_insert(0);
        *counter += 1;
        Ok(compose_number(
            &key.scope,
            key.year,
            *counter,
            self.sequence_padding,
        ))
    }

    fn allocate_journal_number(&self, id: JournalId, year: i32) -> Result<String, LedgerError> {
        let mut inner = self.lock()?;
        let journal = inner
            .journals
            .get_mut(&id)
            .ok_or(LedgerError::JournalNotFound(id))?;
        Ok(journal.allocate(year))
    }

    fn commit_posting(
        &self,
        entry: &LedgerEntry,
        changes: &[BalanceChange],
    ) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        let stored = inner
            .entries
            .get(&entry.id)
            .ok_or(LedgerError::EntryNotFound(entry.id))?;
        // At-most-once: a retried post against an already-posted entry is a
        // no-op failure, never a double application.
        if stored.status == EntryStatus::Posted {
            return Err(LedgerError::IllegalTransition {
                from: EntryStatus::Posted,
                to: EntryStatus::Posted,
            });
        }
        Self::apply_changes(&mut inner.balances, changes)?;
        inner.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    fn commit_reversal(
        &self,
        reversal: &LedgerEntry,
        changes: &[BalanceChange],
        original: &LedgerEntry,
    ) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        if inner.numbers.contains(&reversal.number) {
            return Err(LedgerError::DuplicateNumber(reversal.number.clone()));
        }
        if !inner.entries.contains_key(&original.id) {
            return Err(LedgerError::EntryNotFound(original.id));
        }
        Self::apply_changes(&mut inner.balances, changes)?;
        inner.numbers.insert(reversal.number.clone());
        inner.entries.insert(reversal.id, reversal.clone());
        inner.entries.insert(original.id, original.clone());
        Ok(())
    }
}
