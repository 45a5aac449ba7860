//! Ledger entry aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, CostCenterId, EntryId, PaymentTermId, ProductId, ThirdPartyId, UserId,
};

use super::types::{EntryKind, EntryOrigin, EntryStatus, EntryTotals};

/// A single line in a ledger entry.
///
/// Lines are exclusively owned by their entry and keyed by
/// `(entry_id, line_number)`; deleting the entry deletes its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// 1-based position within the entry, assigned in input order.
    pub line_number: u32,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit_amount: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit_amount: Decimal,
    /// Optional description for this line.
    pub description: Option<String>,
    /// Optional third party (customer/supplier) reference.
    pub third_party_id: Option<ThirdPartyId>,
    /// Optional cost center reference.
    pub cost_center_id: Option<CostCenterId>,
    /// Optional product reference.
    pub product_id: Option<ProductId>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional payment-terms reference (may coexist with `due_date`).
    pub payment_term_id: Option<PaymentTermId>,
    /// Free-form reference text.
    pub reference: Option<String>,
}

impl LedgerLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit_amount - self.credit_amount
    }
}

/// A balanced double-entry ledger entry (header + lines).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Unique, generated entry number.
    pub number: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Business origin, if known.
    pub origin: Option<EntryOrigin>,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Current lifecycle status.
    pub status: EntryStatus,
    /// Total debit amount across lines.
    pub total_debit: Decimal,
    /// Total credit amount across lines.
    pub total_credit: Decimal,
    /// User who created the entry.
    pub created_by: UserId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// User who approved the entry, once approved.
    pub approved_by: Option<UserId>,
    /// When the entry was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// User who posted the entry, once posted.
    pub posted_by: Option<UserId>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Business date of the posting.
    pub posting_date: Option<NaiveDate>,
    /// User who cancelled the entry, once cancelled.
    pub cancelled_by: Option<UserId>,
    /// When the entry was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Free-form notes; also accumulates audit annotations.
    pub notes: Option<String>,
    /// Optional external document reference.
    pub external_reference: Option<String>,
    /// The lines, ordered by `line_number`.
    pub lines: Vec<LedgerLine>,
}

impl LedgerEntry {
    /// Recomputes totals from the entry's lines.
    #[must_use]
    pub fn compute_totals(&self) -> EntryTotals {
        let debit: Decimal = self.lines.iter().map(|l| l.debit_amount).sum();
        let credit: Decimal = self.lines.iter().map(|l| l.credit_amount).sum();
        EntryTotals::new(debit, credit)
    }

    /// Appends a line to the notes field, preserving existing content.
    pub fn append_note(&mut self, note: &str) {
        match &mut self.notes {
            Some(existing) if !existing.is_empty() => {
                existing.push('\n');
                existing.push_str(note);
            }
            _ => self.notes = Some(note.to_string()),
        }
    }

    /// Appends a lightweight audit annotation (actor, action, timestamp,
    /// optional reason) to the notes field.
    pub fn append_audit(
        &mut self,
        at: DateTime<Utc>,
        by: UserId,
        action: &str,
        reason: Option<&str>,
    ) {
        let stamp = at.format("%Y-%m-%dT%H:%M:%SZ");
        let note = match reason {
            Some(reason) => format!("[{stamp}] {by} {action}: {reason}"),
            None => format!("[{stamp}] {by} {action}"),
        };
        self.append_note(&note);
    }
}
