//! Storage seam consumed by the ledger services.
//!
//! The core never talks to a database directly. Everything it needs from
//! persistence (entries, account metadata and balances, journal counters,
//! the atomic posting commit) goes through [`LedgerStore`]. The
//! in-memory implementation in [`memory`] is the reference used by the test
//! suite; a real deployment backs this trait with a transactional database.

pub mod memory;

use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, EntryId, JournalId};

use crate::ledger::balance::{AccountBalance, BalanceChange};
use crate::ledger::entry::LedgerEntry;
use crate::ledger::error::LedgerError;
use crate::ledger::types::EntryKind;

pub use memory::MemoryLedger;

/// Account metadata needed to validate a posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Whether the account accepts postings (leaf, movement-enabled).
    pub accepts_movements: bool,
    /// Whether lines on this account must carry a third-party reference.
    pub requires_third_party: bool,
    /// Whether lines on this account must carry a cost-center reference.
    pub requires_cost_center: bool,
}

/// Storage operations required by the ledger core.
///
/// Implementations must serialize concurrent access per record: sequence
/// increments are atomic (row lock or CAS), and the posting commits are
/// all-or-nothing: no partially applied balance changes survive a failure.
pub trait LedgerStore {
    /// Loads an entry by id.
    fn entry(&self, id: EntryId) -> Result<LedgerEntry, LedgerError>;

    /// Loads an entry by its unique entry number, if one exists.
    fn entry_by_number(&self, number: &str) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Inserts a new entry; the entry number must be unique.
    fn insert_entry(&self, entry: LedgerEntry) -> Result<(), LedgerError>;

    /// Replaces a stored entry.
    fn update_entry(&self, entry: LedgerEntry) -> Result<(), LedgerError>;

    /// Deletes an entry and, with it, all of its lines.
    fn delete_entry(&self, id: EntryId) -> Result<(), LedgerError>;

    /// Returns true if an entry with this number exists.
    fn number_exists(&self, number: &str) -> Result<bool, LedgerError>;

    /// Loads account metadata for validation.
    fn account(&self, id: AccountId) -> Result<AccountInfo, LedgerError>;

    /// Loads an account's running balance.
    fn account_balance(&self, id: AccountId) -> Result<AccountBalance, LedgerError>;

    /// Allocates the next entry number for `(kind, year)` atomically.
    fn allocate_entry_number(&self, kind: EntryKind, year: i32) -> Result<String, LedgerError>;

    /// Allocates the next number from a journal's sequence atomically,
    /// persisting the mutated counter with the journal record.
    fn allocate_journal_number(&self, id: JournalId, year: i32) -> Result<String, LedgerError>;

    /// Commits a posting of an already-stored entry: applies all balance
    /// changes and replaces the entry in one atomic unit. Fails without any
    /// effect if the stored entry is already Posted, so a retried post cannot
    /// double-apply balances.
    fn commit_posting(
        &self,
        entry: &LedgerEntry,
        changes: &[BalanceChange],
    ) -> Result<(), LedgerError>;

    /// Commits a reversal: inserts the new, already-Posted reversal entry,
    /// applies its balance changes, and replaces the original entry, all in
    /// one atomic unit. Fails without any effect if the reversal number
    /// already exists, so neither entry is ever left half-updated.
    fn commit_reversal(
        &self,
        reversal: &LedgerEntry,
        changes: &[BalanceChange],
        original: &LedgerEntry,
    ) -> Result<(), LedgerError>;
}
