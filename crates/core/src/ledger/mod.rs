//! Double-entry ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Entry aggregates (header + lines)
//! - Business rule validation
//! - Sequence allocation for entry and journal numbers
//! - Account balance propagation
//! - Error types for ledger operations
//! - Entry service for creation, update, and deletion

pub mod balance;
pub mod entry;
pub mod error;
pub mod sequence;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, BalanceChange};
pub use entry::{LedgerEntry, LedgerLine};
pub use error::LedgerError;
pub use sequence::{Journal, SequenceKey};
pub use service::EntryService;
pub use types::{
    CreateEntryInput, EntryKind, EntryOrigin, EntryPatch, EntryStatus, EntryTotals, LineInput,
};
