//! Reversal engine: builds offsetting entries for posted entries.
//!
//! A reversal is a new entry whose lines exactly offset a posted entry's
//! lines (debit and credit swapped, everything else preserved). It is created
//! directly in Posted status because it must take immediate effect; the
//! balance propagator runs for its lines exactly as for a normal post.

use chrono::{DateTime, Utc};

use tally_shared::types::{EntryId, UserId};

use crate::ledger::entry::{LedgerEntry, LedgerLine};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{EntryKind, EntryStatus};

/// Derives the reversal number for an original entry number.
///
/// The derived number inherits the original's uniqueness, so reversing the
/// same entry twice collides on insert - the store's unique number constraint
/// is the second line of defense behind the explicit pre-check.
#[must_use]
pub fn reversal_number(original_number: &str) -> String {
    format!("REV-{original_number}")
}

/// Builds the reversal entry for a posted original.
///
/// Each line is copied with debit and credit swapped; account, third-party,
/// cost-center, product, and reference are preserved; the line description is
/// prefixed to mark it as a reversal of the source line. Since the original
/// was balanced, the reversal is balanced by construction.
///
/// # Errors
///
/// Returns `CannotReverseReversal` when the original is itself a reversal,
/// or `IllegalTransition` when the original is not Posted.
pub fn build_reversal(
    original: &LedgerEntry,
    by: UserId,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<LedgerEntry, LedgerError> {
    if original.kind == EntryKind::Reversal {
        return Err(LedgerError::CannotReverseReversal(original.id));
    }
    if original.status != EntryStatus::Posted {
        return Err(LedgerError::IllegalTransition {
            from: original.status,
            to: EntryStatus::Posted,
        });
    }

    let lines: Vec<LedgerLine> = original
        .lines
        .iter()
        .map(|line| LedgerLine {
            line_number: line.line_number,
            account_id: line.account_id,
            // Swap debit and credit.
            debit_amount: line.credit_amount,
            credit_amount: line.debit_amount,
            description: Some(format!(
                "Reversal: {}",
                line.description.clone().unwrap_or_default()
            )),
            third_party_id: line.third_party_id,
            cost_center_id: line.cost_center_id,
            product_id: line.product_id,
            due_date: line.due_date,
            payment_term_id: line.payment_term_id,
            reference: line.reference.clone(),
        })
        .collect();

    Ok(LedgerEntry {
        id: EntryId::new(),
        number: reversal_number(&original.number),
        kind: EntryKind::Reversal,
        origin: original.origin,
        entry_date: at.date_naive(),
        status: EntryStatus::Posted,
        // Totals are the transposed originals.
        total_debit: original.total_credit,
        total_credit: original.total_debit,
        created_by: by,
        created_at: at,
        approved_by: None,
        approved_at: None,
        posted_by: Some(by),
        posted_at: Some(at),
        posting_date: Some(at.date_naive()),
        cancelled_by: None,
        cancelled_at: None,
        notes: Some(format!(
            "Reversal of entry {}. Reason: {reason}",
            original.number
        )),
        external_reference: Some(original.number.clone()),
        lines,
    })
}
