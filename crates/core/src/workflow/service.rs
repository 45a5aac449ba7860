//! Workflow service driving entries through their lifecycle.
//!
//! Every method loads the entry, resolves the requested event against the
//! lifecycle table, re-validates invariants where the transition demands it,
//! and commits through the store. Posting is the only transition with an
//! external side effect (balance propagation) and is committed atomically.

use chrono::Utc;

use tally_shared::types::{EntryId, UserId};

use crate::ledger::balance::propagation;
use crate::ledger::entry::LedgerEntry;
use crate::ledger::error::LedgerError;
use crate::ledger::types::EntryStatus;
use crate::ledger::validation::validate_entry;
use crate::store::LedgerStore;

use super::lifecycle::{forced_reset_allowed, transition, LifecycleEvent};
use super::reversal::{build_reversal, reversal_number};

/// Service for lifecycle transitions on ledger entries.
#[derive(Debug, Clone)]
pub struct WorkflowService<S> {
    store: S,
}

impl<S: LedgerStore> WorkflowService<S> {
    /// Creates a new service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Submits a Draft entry for approval.
    pub fn submit(&self, id: EntryId, by: UserId) -> Result<LedgerEntry, LedgerError> {
        let mut entry = self.store.entry(id)?;
        entry.status = transition(entry.status, LifecycleEvent::Submit)?;
        entry.append_audit(Utc::now(), by, "submitted for approval", None);
        self.store.update_entry(entry.clone())?;
        Ok(entry)
    }

    /// Approves a Draft/Pending entry after re-validating its invariants.
    pub fn approve(&self, id: EntryId, by: UserId) -> Result<LedgerEntry, LedgerError> {
        let mut entry = self.store.entry(id)?;
        let new_status = transition(entry.status, LifecycleEvent::Approve)?;
        validate_entry(&entry, |account| self.store.account(account))?;

        let now = Utc::now();
        entry.status = new_status;
        entry.approved_by = Some(by);
        entry.approved_at = Some(now);
        entry.append_audit(now, by, "approved", None);
        self.store.update_entry(entry.clone())?;
        tracing::info!(entry = %entry.number, "entry approved");
        Ok(entry)
    }

    /// Posts an Approved entry, propagating every line to account balances.
    ///
    /// The status change and the balance propagation commit as one atomic
    /// unit: if propagation fails partway, no balance change persists and the
    /// entry stays Approved.
    pub fn post(&self, id: EntryId, by: UserId) -> Result<LedgerEntry, LedgerError> {
        let mut entry = self.store.entry(id)?;
        let new_status = transition(entry.status, LifecycleEvent::Post)?;
        validate_entry(&entry, |account| self.store.account(account))?;

        let now = Utc::now();
        entry.status = new_status;
        entry.posted_by = Some(by);
        entry.posted_at = Some(now);
        entry.posting_date = Some(now.date_naive());
        entry.append_audit(now, by, "posted", None);

        let changes = propagation(&entry.lines);
        self.store.commit_posting(&entry, &changes)?;
        tracing::info!(entry = %entry.number, "entry posted");
        Ok(entry)
    }

    /// Resets an entry back to Draft.
    ///
    /// Unconditional from Pending/Approved. From Posted/Cancelled only in
    /// forced mode with a justification: that path bypasses normal audit
    /// controls and is logged as such. Balances already propagated by a
    /// posting are NOT rewound.
    pub fn reset_to_draft(
        &self,
        id: EntryId,
        by: UserId,
        force: bool,
        reason: Option<&str>,
    ) -> Result<LedgerEntry, LedgerError> {
        let mut entry = self.store.entry(id)?;
        let from = entry.status;

        match transition(from, LifecycleEvent::ResetToDraft) {
            Ok(_) => {}
            Err(err) => {
                if !(force && forced_reset_allowed(from)) {
                    return Err(err);
                }
                let justification = reason
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(LedgerError::ReasonRequired)?;
                tracing::warn!(
                    entry = %entry.number,
                    from = %from,
                    justification,
                    "forced reset to draft bypasses audit controls"
                );
            }
        }

        let now = Utc::now();
        entry.status = EntryStatus::Draft;
        entry.approved_by = None;
        entry.approved_at = None;
        entry.posted_by = None;
        entry.posted_at = None;
        entry.posting_date = None;
        entry.cancelled_by = None;
        entry.cancelled_at = None;
        entry.append_audit(now, by, "reset to draft", reason);
        self.store.update_entry(entry.clone())?;
        Ok(entry)
    }

    /// Cancels an entry.
    ///
    /// Draft/Pending/Approved entries are cancelled directly with the reason
    /// appended to notes. A Posted entry is never edited: the reversal engine
    /// creates an offsetting Posted entry and the original is marked
    /// Cancelled, cross-referencing the reversal number. Both writes land in
    /// one atomic store commit, so a failure can never leave a posted
    /// reversal next to a still-Posted original. Both entries remain in
    /// storage as the audit trail.
    pub fn cancel(
        &self,
        id: EntryId,
        by: UserId,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        if reason.trim().is_empty() {
            return Err(LedgerError::ReasonRequired);
        }

        let mut entry = self.store.entry(id)?;
        let new_status = transition(entry.status, LifecycleEvent::Cancel)?;
        let now = Utc::now();

        if entry.status == EntryStatus::Posted {
            let number = reversal_number(&entry.number);
            if self.store.number_exists(&number)? {
                return Err(LedgerError::AlreadyReversed { number });
            }
            let reversal = build_reversal(&entry, by, reason, now)?;
            let changes = propagation(&reversal.lines);

            entry.status = new_status;
            entry.cancelled_by = Some(by);
            entry.cancelled_at = Some(now);
            entry.append_audit(
                now,
                by,
                &format!("cancelled, reversed by {}", reversal.number),
                Some(reason),
            );
            self.store.commit_reversal(&reversal, &changes, &entry)?;
            tracing::info!(
                entry = %entry.number,
                reversal = %reversal.number,
                "posted entry cancelled via reversal"
            );
        } else {
            entry.status = new_status;
            entry.cancelled_by = Some(by);
            entry.cancelled_at = Some(now);
            entry.append_audit(now, by, "cancelled", Some(reason));
            self.store.update_entry(entry.clone())?;
            tracing::info!(entry = %entry.number, "entry cancelled");
        }

        Ok(entry)
    }

    /// Reverses a Posted entry without touching its status.
    ///
    /// Same mechanics as a cancellation-triggered reversal, but the caller
    /// decides whether to also cancel the original. Returns the new reversal
    /// entry.
    pub fn reverse(
        &self,
        id: EntryId,
        by: UserId,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        if reason.trim().is_empty() {
            return Err(LedgerError::ReasonRequired);
        }

        let mut entry = self.store.entry(id)?;
        let number = reversal_number(&entry.number);
        if self.store.number_exists(&number)? {
            return Err(LedgerError::AlreadyReversed { number });
        }

        let now = Utc::now();
        let reversal = build_reversal(&entry, by, reason, now)?;
        let changes = propagation(&reversal.lines);

        // Status untouched; the annotation keeps the audit trail discoverable.
        entry.append_audit(now, by, &format!("reversed by {}", reversal.number), Some(reason));
        self.store.commit_reversal(&reversal, &changes, &entry)?;
        tracing::info!(reversal = %reversal.number, "entry reversed");
        Ok(reversal)
    }
}
