//! Entry service for creation, update, and deletion.
//!
//! State transitions (submit/approve/post/cancel/reverse/reset) live in
//! `workflow`; this service owns the Draft-side of the lifecycle.

use chrono::{Datelike, Utc};

use tally_shared::types::EntryId;

use super::entry::{LedgerEntry, LedgerLine};
use super::error::LedgerError;
use super::types::{CreateEntryInput, EntryPatch, EntryStatus, LineInput};
use super::validation::validate_line_inputs;
use crate::store::LedgerStore;

/// Service for constructing and maintaining draft entries.
#[derive(Debug, Clone)]
pub struct EntryService<S> {
    store: S,
}

impl<S: LedgerStore> EntryService<S> {
    /// Creates a new service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads an entry by id.
    pub fn get(&self, id: EntryId) -> Result<LedgerEntry, LedgerError> {
        self.store.entry(id)
    }

    /// Creates a new Draft entry from validated input.
    ///
    /// The entry number is allocated only after every other precondition has
    /// passed, to minimize gaps from consumed-but-unused numbers.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` when validation fails: fewer than 2 lines, a
    /// one-sided-amount violation, negative amounts, an unbalanced line set,
    /// a non-postable account, or a missing required third-party/cost-center
    /// reference.
    pub fn create(&self, input: CreateEntryInput) -> Result<LedgerEntry, LedgerError> {
        let totals = validate_line_inputs(&input.lines, |id| self.store.account(id))?;

        let number = self
            .store
            .allocate_entry_number(input.kind, input.entry_date.year())?;

        let entry = LedgerEntry {
            id: EntryId::new(),
            number,
            kind: input.kind,
            origin: input.origin,
            entry_date: input.entry_date,
            status: EntryStatus::Draft,
            total_debit: totals.debit,
            total_credit: totals.credit,
            created_by: input.created_by,
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            posted_by: None,
            posted_at: None,
            posting_date: None,
            cancelled_by: None,
            cancelled_at: None,
            notes: input.notes,
            external_reference: input.external_reference,
            lines: number_lines(input.lines),
        };

        self.store.insert_entry(entry.clone())?;
        tracing::info!(entry = %entry.number, kind = ?entry.kind, "ledger entry created");
        Ok(entry)
    }

    /// Updates a Draft/Pending entry.
    ///
    /// A `lines` patch replaces the full line set (never merges), re-runs
    /// creation validation, and recomputes totals.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` for Approved/Posted/Cancelled entries, or any
    /// validation error from a line replacement.
    pub fn update(&self, id: EntryId, patch: EntryPatch) -> Result<LedgerEntry, LedgerError> {
        let mut entry = self.store.entry(id)?;
        if !entry.status.is_editable() {
            return Err(LedgerError::NotEditable(entry.status));
        }

        if let Some(entry_date) = patch.entry_date {
            entry.entry_date = entry_date;
        }
        if let Some(origin) = patch.origin {
            entry.origin = Some(origin);
        }
        if let Some(notes) = patch.notes {
            entry.notes = Some(notes);
        }
        if let Some(external_reference) = patch.external_reference {
            entry.external_reference = Some(external_reference);
        }
        if let Some(lines) = patch.lines {
            let totals = validate_line_inputs(&lines, |id| self.store.account(id))?;
            entry.lines = number_lines(lines);
            entry.total_debit = totals.debit;
            entry.total_credit = totals.credit;
        }

        self.store.update_entry(entry.clone())?;
        Ok(entry)
    }

    /// Deletes a Draft entry together with its lines.
    ///
    /// # Errors
    ///
    /// Returns `OnlyDraftDeletable` for any other status.
    pub fn delete(&self, id: EntryId) -> Result<(), LedgerError> {
        let entry = self.store.entry(id)?;
        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::OnlyDraftDeletable(entry.status));
        }
        self.store.delete_entry(id)?;
        tracing::info!(entry = %entry.number, "ledger entry deleted");
        Ok(())
    }
}

/// Converts line inputs to stored lines, assigning 1-based sequential
/// line numbers in input order.
fn number_lines(lines: Vec<LineInput>) -> Vec<LedgerLine> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| LedgerLine {
            line_number: index as u32 + 1,
            account_id: line.account_id,
            debit_amount: line.debit_amount,
            credit_amount: line.credit_amount,
            description: line.description,
            third_party_id: line.third_party_id,
            cost_center_id: line.cost_center_id,
            product_id: line.product_id,
            due_date: line.due_date,
            payment_term_id: line.payment_term_id,
            reference: line.reference,
        })
        .collect()
}
