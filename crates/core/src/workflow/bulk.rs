//! Bulk orchestration over lifecycle operations.
//!
//! Validate-all-first: every item is checked read-only before anything is
//! attempted, so callers see the full picture instead of a half-applied
//! batch. Items that fail the check are reported and skipped; the rest are
//! processed in chunks, each item isolated so one failure never poisons its
//! neighbors. Only infrastructure errors abort the whole batch.
//!
//! `force` widens what gets attempted: it overrides warnings and recoverable
//! pre-check errors, but never a hard block (missing entry, existing
//! reversal). A forced attempt can still fail at execution; the invariants
//! the services enforce are not negotiable.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use tally_shared::types::{EntryId, UserId};

use crate::ledger::error::LedgerError;
use crate::ledger::service::EntryService;
use crate::ledger::types::{EntryKind, EntryStatus};
use crate::ledger::validation::validate_entry;
use crate::store::LedgerStore;

use super::lifecycle::{forced_reset_allowed, transition, LifecycleEvent};
use super::reversal::reversal_number;
use super::service::WorkflowService;

/// Default number of items committed per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// The lifecycle operation a bulk request applies to every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperation {
    /// Approve each entry.
    Approve,
    /// Post each entry.
    Post,
    /// Cancel each entry (reversing posted ones).
    Cancel,
    /// Reverse each posted entry.
    Reverse,
    /// Reset each entry to draft.
    ResetToDraft,
    /// Delete each draft entry.
    Delete,
}

impl BulkOperation {
    /// Whether this operation requires a reason under the given options.
    const fn requires_reason(self, force: bool) -> bool {
        match self {
            Self::Cancel | Self::Reverse => true,
            Self::ResetToDraft => force,
            Self::Approve | Self::Post | Self::Delete => false,
        }
    }
}

/// Caller options for a bulk request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOptions {
    /// Override warnings and recoverable pre-check errors.
    pub force: bool,
    /// Justification recorded on each affected entry.
    pub reason: Option<String>,
}

/// One issue found while checking an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIssue {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl From<&LedgerError> for CheckIssue {
    fn from(err: &LedgerError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Read-only verdict for one item of a bulk request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationCheck {
    /// The entry checked.
    pub id: EntryId,
    /// True when the operation can proceed without `force`.
    pub can_perform: bool,
    /// True when not even `force` may attempt the item.
    pub hard_blocked: bool,
    /// Blocking errors.
    pub errors: Vec<CheckIssue>,
    /// Non-blocking findings that `force` can override.
    pub warnings: Vec<String>,
}

impl OperationCheck {
    fn clear(id: EntryId) -> Self {
        Self {
            id,
            can_perform: true,
            hard_blocked: false,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn push_error(&mut self, err: &LedgerError) {
        self.can_perform = false;
        if err.is_hard_block() {
            self.hard_blocked = true;
        }
        self.errors.push(CheckIssue::from(err));
    }

    fn push_warning(&mut self, message: impl Into<String>) {
        self.can_perform = false;
        self.warnings.push(message.into());
    }

    /// Whether the executor should attempt this item.
    fn attemptable(&self, force: bool) -> bool {
        self.can_perform || (force && !self.hard_blocked)
    }
}

/// One item that failed or was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    /// The entry that failed.
    pub id: EntryId,
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// Outcome of a bulk request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkReport {
    /// Number of ids in the request.
    pub total_requested: usize,
    /// Number of items that completed.
    pub total_succeeded: usize,
    /// Number of items that failed or were skipped.
    pub total_failed: usize,
    /// Ids of completed items, in processing order.
    pub succeeded: Vec<EntryId>,
    /// Failed/skipped items with their first blocking issue.
    pub failed: Vec<BulkFailure>,
    /// Warnings that were overridden by `force`.
    pub warnings: Vec<String>,
}

/// Orchestrates a lifecycle operation across many entries.
#[derive(Debug, Clone)]
pub struct BulkOrchestrator<S> {
    store: S,
    workflow: WorkflowService<S>,
    entries: EntryService<S>,
    chunk_size: usize,
}

impl<S: LedgerStore + Clone> BulkOrchestrator<S> {
    /// Creates an orchestrator with the default chunk size.
    pub fn new(store: S) -> Self {
        Self::with_chunk_size(store, DEFAULT_CHUNK_SIZE)
    }

    /// Creates an orchestrator using the configured chunk size.
    pub fn with_config(store: S, config: &tally_shared::config::LedgerConfig) -> Self {
        Self::with_chunk_size(store, config.bulk_chunk_size)
    }

    /// Creates an orchestrator committing `chunk_size` items per chunk.
    pub fn with_chunk_size(store: S, chunk_size: usize) -> Self {
        Self {
            workflow: WorkflowService::new(store.clone()),
            entries: EntryService::new(store.clone()),
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Checks every item read-only, without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures; per-item problems
    /// are reported in the returned checks.
    pub fn validate_for(
        &self,
        ids: &[EntryId],
        op: BulkOperation,
    ) -> Result<Vec<OperationCheck>, LedgerError> {
        ids.iter().map(|&id| self.check_one(id, op)).collect()
    }

    /// Runs the operation over all ids.
    ///
    /// Every item is checked first; items that pass (or that `force` may
    /// attempt) are processed in chunks of the configured size, each chunk
    /// committed before the next starts. A failed item is reported and the
    /// batch continues.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` when the operation demands a justification and
    /// none was given, or any infrastructure error, which aborts the batch.
    pub fn execute(
        &self,
        ids: &[EntryId],
        op: BulkOperation,
        actor: UserId,
        options: &BulkOptions,
    ) -> Result<BulkReport, LedgerError> {
        let reason = options.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
        if op.requires_reason(options.force) && reason.is_none() {
            return Err(LedgerError::ReasonRequired);
        }

        let checks = self.validate_for(ids, op)?;
        let mut report = BulkReport {
            total_requested: ids.len(),
            ..BulkReport::default()
        };

        let mut attempt = Vec::new();
        for check in checks {
            if check.attemptable(options.force) {
                if options.force {
                    report.warnings.extend(check.warnings);
                }
                attempt.push(check.id);
            } else {
                let failure = check
                    .errors
                    .first()
                    .map(|issue| BulkFailure {
                        id: check.id,
                        code: issue.code.clone(),
                        message: issue.message.clone(),
                    })
                    .unwrap_or_else(|| BulkFailure {
                        id: check.id,
                        code: "UNACKNOWLEDGED_WARNING".to_string(),
                        message: check.warnings.join("; "),
                    });
                report.failed.push(failure);
            }
        }

        for (index, chunk) in attempt.chunks(self.chunk_size).enumerate() {
            tracing::debug!(chunk = index, size = chunk.len(), op = ?op, "processing bulk chunk");
            for &id in chunk {
                match self.apply_one(id, op, actor, options, reason) {
                    Ok(()) => report.succeeded.push(id),
                    Err(err) if err.is_infrastructure() => return Err(err),
                    Err(err) => report.failed.push(BulkFailure {
                        id,
                        code: err.error_code().to_string(),
                        message: err.to_string(),
                    }),
                }
            }
        }

        report.total_succeeded = report.succeeded.len();
        report.total_failed = report.failed.len();
        tracing::info!(
            op = ?op,
            requested = report.total_requested,
            succeeded = report.total_succeeded,
            failed = report.total_failed,
            "bulk operation finished"
        );
        Ok(report)
    }

    fn check_one(&self, id: EntryId, op: BulkOperation) -> Result<OperationCheck, LedgerError> {
        let mut check = OperationCheck::clear(id);
        let entry = match self.store.entry(id) {
            Ok(entry) => entry,
            Err(err) if err.is_infrastructure() => return Err(err),
            Err(err) => {
                check.push_error(&err);
                return Ok(check);
            }
        };

        let today = Utc::now().date_naive();
        match op {
            BulkOperation::Approve | BulkOperation::Post => {
                let event = if op == BulkOperation::Approve {
                    LifecycleEvent::Approve
                } else {
                    LifecycleEvent::Post
                };
                if let Err(err) = transition(entry.status, event) {
                    check.push_error(&err);
                }
                if let Err(err) = validate_entry(&entry, |account| self.store.account(account)) {
                    if err.is_infrastructure() {
                        return Err(err);
                    }
                    check.push_error(&err);
                }
                if entry.entry_date > today {
                    check.push_warning(format!(
                        "entry {} is dated in the future ({})",
                        entry.number, entry.entry_date
                    ));
                }
            }
            BulkOperation::Cancel => {
                if let Err(err) = transition(entry.status, LifecycleEvent::Cancel) {
                    check.push_error(&err);
                } else if entry.status == EntryStatus::Posted {
                    self.check_reversible(&entry.number, entry.kind, id, &mut check)?;
                }
            }
            BulkOperation::Reverse => {
                if entry.status != EntryStatus::Posted {
                    check.push_error(&LedgerError::IllegalTransition {
                        from: entry.status,
                        to: EntryStatus::Posted,
                    });
                } else {
                    self.check_reversible(&entry.number, entry.kind, id, &mut check)?;
                }
            }
            BulkOperation::ResetToDraft => {
                if let Err(err) = transition(entry.status, LifecycleEvent::ResetToDraft) {
                    if forced_reset_allowed(entry.status) {
                        // Recoverable: force attempts the escape hatch.
                        check.push_error(&err);
                    } else {
                        check.push_error(&err);
                        check.hard_blocked = true;
                    }
                }
            }
            BulkOperation::Delete => {
                if entry.status != EntryStatus::Draft {
                    check.push_error(&LedgerError::OnlyDraftDeletable(entry.status));
                }
            }
        }

        Ok(check)
    }

    fn check_reversible(
        &self,
        number: &str,
        kind: EntryKind,
        id: EntryId,
        check: &mut OperationCheck,
    ) -> Result<(), LedgerError> {
        if kind == EntryKind::Reversal {
            check.push_error(&LedgerError::CannotReverseReversal(id));
            check.hard_blocked = true;
        }
        if self.store.number_exists(&reversal_number(number))? {
            check.push_error(&LedgerError::AlreadyReversed {
                number: reversal_number(number),
            });
        }
        Ok(())
    }

    fn apply_one(
        &self,
        id: EntryId,
        op: BulkOperation,
        actor: UserId,
        options: &BulkOptions,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        match op {
            BulkOperation::Approve => self.workflow.approve(id, actor).map(drop),
            BulkOperation::Post => {
                if options.force {
                    // Forced posting walks a draft/pending entry through
                    // approval first.
                    let status = self.store.entry(id)?.status;
                    if matches!(status, EntryStatus::Draft | EntryStatus::Pending) {
                        self.workflow.approve(id, actor)?;
                    }
                }
                self.workflow.post(id, actor).map(drop)
            }
            BulkOperation::Cancel => {
                let reason = reason.ok_or(LedgerError::ReasonRequired)?;
                self.workflow.cancel(id, actor, reason).map(drop)
            }
            BulkOperation::Reverse => {
                let reason = reason.ok_or(LedgerError::ReasonRequired)?;
                self.workflow.reverse(id, actor, reason).map(drop)
            }
            BulkOperation::ResetToDraft => self
                .workflow
                .reset_to_draft(id, actor, options.force, reason)
                .map(drop),
            BulkOperation::Delete => self.entries.delete(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tally_shared::types::AccountId;

    use crate::ledger::entry::LedgerEntry;
    use crate::ledger::types::{CreateEntryInput, LineInput};
    use crate::store::{AccountInfo, MemoryLedger};

    struct Fixture {
        store: MemoryLedger,
        entries: EntryService<MemoryLedger>,
        workflow: WorkflowService<MemoryLedger>,
        bulk: BulkOrchestrator<MemoryLedger>,
        a: AccountId,
        b: AccountId,
        user: UserId,
    }

    fn setup() -> Fixture {
        let store = MemoryLedger::new();
        let a = AccountId::new();
        let b = AccountId::new();
        for id in [a, b] {
            store
                .add_account(AccountInfo {
                    id,
                    accepts_movements: true,
                    requires_third_party: false,
                    requires_cost_center: false,
                })
                .unwrap();
        }
        Fixture {
            entries: EntryService::new(store.clone()),
            workflow: WorkflowService::new(store.clone()),
            bulk: BulkOrchestrator::new(store.clone()),
            store,
            a,
            b,
            user: UserId::new(),
        }
    }

    fn line(account_id: AccountId, debit: Decimal, credit: Decimal) -> LineInput {
        LineInput {
            account_id,
            debit_amount: debit,
            credit_amount: credit,
            description: None,
            third_party_id: None,
            cost_center_id: None,
            product_id: None,
            due_date: None,
            payment_term_id: None,
            reference: None,
        }
    }

    fn draft_on(fx: &Fixture, date: NaiveDate) -> LedgerEntry {
        fx.entries
            .create(CreateEntryInput {
                kind: crate::ledger::types::EntryKind::Manual,
                origin: None,
                entry_date: date,
                notes: None,
                external_reference: None,
                lines: vec![
                    line(fx.a, dec!(100), Decimal::ZERO),
                    line(fx.b, Decimal::ZERO, dec!(100)),
                ],
                created_by: fx.user,
            })
            .unwrap()
    }

    fn draft(fx: &Fixture) -> LedgerEntry {
        draft_on(fx, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
    }

    fn posted(fx: &Fixture) -> LedgerEntry {
        let entry = draft(fx);
        fx.workflow.approve(entry.id, fx.user).unwrap();
        fx.workflow.post(entry.id, fx.user).unwrap()
    }

    fn corrupt_balance(fx: &Fixture, entry: &LedgerEntry) {
        use crate::store::LedgerStore as _;
        let mut broken = entry.clone();
        broken.lines[0].debit_amount = dec!(70);
        fx.store.update_entry(broken).unwrap();
    }

    #[test]
    fn test_mixed_batch_isolates_failures() {
        let fx = setup();
        let good: Vec<_> = (0..3).map(|_| draft(&fx)).collect();
        let bad: Vec<_> = (0..2).map(|_| draft(&fx)).collect();
        for entry in &bad {
            corrupt_balance(&fx, entry);
        }

        let mut ids: Vec<_> = good.iter().map(|e| e.id).collect();
        ids.extend(bad.iter().map(|e| e.id));

        let report = fx
            .bulk
            .execute(&ids, BulkOperation::Approve, fx.user, &BulkOptions::default())
            .unwrap();

        assert_eq!(report.total_requested, 5);
        assert_eq!(report.total_succeeded, 3);
        assert_eq!(report.total_failed, 2);
        for failure in &report.failed {
            assert_eq!(failure.code, "UNBALANCED_ENTRY");
        }
        for entry in &good {
            assert_eq!(
                fx.entries.get(entry.id).unwrap().status,
                EntryStatus::Approved
            );
        }
        // Failed items keep their status.
        for entry in &bad {
            assert_eq!(fx.entries.get(entry.id).unwrap().status, EntryStatus::Draft);
        }
    }

    #[test]
    fn test_missing_entry_blocks_even_with_force() {
        let fx = setup();
        let entry = draft(&fx);
        let ghost = EntryId::new();

        let report = fx
            .bulk
            .execute(
                &[entry.id, ghost],
                BulkOperation::Approve,
                fx.user,
                &BulkOptions {
                    force: true,
                    reason: None,
                },
            )
            .unwrap();

        assert_eq!(report.total_succeeded, 1);
        assert_eq!(report.total_failed, 1);
        assert_eq!(report.failed[0].id, ghost);
        assert_eq!(report.failed[0].code, "ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_warnings_block_without_force() {
        let fx = setup();
        let future = Utc::now().date_naive() + Duration::days(30);
        let ids: Vec<_> = (0..5).map(|_| draft_on(&fx, future).id).collect();

        let report = fx
            .bulk
            .execute(&ids, BulkOperation::Approve, fx.user, &BulkOptions::default())
            .unwrap();
        assert_eq!(report.total_succeeded, 0);
        assert_eq!(report.total_failed, 5);
        for failure in &report.failed {
            assert_eq!(failure.code, "UNACKNOWLEDGED_WARNING");
        }
    }

    #[test]
    fn test_force_overrides_warnings() {
        let fx = setup();
        let future = Utc::now().date_naive() + Duration::days(30);
        let ids: Vec<_> = (0..5).map(|_| draft_on(&fx, future).id).collect();

        let report = fx
            .bulk
            .execute(
                &ids,
                BulkOperation::Approve,
                fx.user,
                &BulkOptions {
                    force: true,
                    reason: None,
                },
            )
            .unwrap();
        assert_eq!(report.total_succeeded, 5);
        assert_eq!(report.total_failed, 0);
        // The overridden warnings are surfaced in the report.
        assert_eq!(report.warnings.len(), 5);
    }

    #[test]
    fn test_forced_post_walks_through_approval() {
        let fx = setup();
        use crate::store::LedgerStore as _;
        let entry = draft(&fx);

        let unforced = fx
            .bulk
            .execute(&[entry.id], BulkOperation::Post, fx.user, &BulkOptions::default())
            .unwrap();
        assert_eq!(unforced.total_succeeded, 0);
        assert_eq!(unforced.failed[0].code, "ILLEGAL_STATE_TRANSITION");

        let forced = fx
            .bulk
            .execute(
                &[entry.id],
                BulkOperation::Post,
                fx.user,
                &BulkOptions {
                    force: true,
                    reason: None,
                },
            )
            .unwrap();
        assert_eq!(forced.total_succeeded, 1);
        assert_eq!(fx.entries.get(entry.id).unwrap().status, EntryStatus::Posted);
        assert_eq!(fx.store.account_balance(fx.a).unwrap().debit_total, dec!(100));
    }

    #[test]
    fn test_bulk_reverse_then_rerun_hard_blocks() {
        let fx = setup();
        let ids: Vec<_> = (0..2).map(|_| posted(&fx).id).collect();
        let options = BulkOptions {
            force: true,
            reason: Some("period correction".to_string()),
        };

        let first = fx
            .bulk
            .execute(&ids, BulkOperation::Reverse, fx.user, &options)
            .unwrap();
        assert_eq!(first.total_succeeded, 2);

        // Already reversed: hard block, force does not help.
        let second = fx
            .bulk
            .execute(&ids, BulkOperation::Reverse, fx.user, &options)
            .unwrap();
        assert_eq!(second.total_succeeded, 0);
        assert_eq!(second.total_failed, 2);
        for failure in &second.failed {
            assert_eq!(failure.code, "ALREADY_REVERSED");
        }
    }

    #[test]
    fn test_cancel_requires_reason_upfront() {
        let fx = setup();
        let entry = draft(&fx);
        assert!(matches!(
            fx.bulk.execute(
                &[entry.id],
                BulkOperation::Cancel,
                fx.user,
                &BulkOptions::default()
            ),
            Err(LedgerError::ReasonRequired)
        ));
    }

    #[test]
    fn test_bulk_cancel_mixed_statuses() {
        let fx = setup();
        let a = draft(&fx);
        let b = posted(&fx);
        let options = BulkOptions {
            force: false,
            reason: Some("year-end cleanup".to_string()),
        };

        let report = fx
            .bulk
            .execute(&[a.id, b.id], BulkOperation::Cancel, fx.user, &options)
            .unwrap();
        assert_eq!(report.total_succeeded, 2);
        assert_eq!(fx.entries.get(a.id).unwrap().status, EntryStatus::Cancelled);
        assert_eq!(fx.entries.get(b.id).unwrap().status, EntryStatus::Cancelled);

        // The posted entry was cancelled via a reversal.
        use crate::store::LedgerStore as _;
        assert!(fx.store.number_exists(&format!("REV-{}", b.number)).unwrap());
    }

    #[test]
    fn test_bulk_delete_drafts_only() {
        let fx = setup();
        let d = draft(&fx);
        let p = posted(&fx);

        let report = fx
            .bulk
            .execute(
                &[d.id, p.id],
                BulkOperation::Delete,
                fx.user,
                &BulkOptions::default(),
            )
            .unwrap();
        assert_eq!(report.total_succeeded, 1);
        assert_eq!(report.failed[0].code, "ONLY_DRAFT_DELETABLE");
        assert!(matches!(
            fx.entries.get(d.id),
            Err(LedgerError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_forced_reset_of_posted_batch() {
        let fx = setup();
        let ids: Vec<_> = (0..3).map(|_| posted(&fx).id).collect();

        let unforced = fx
            .bulk
            .execute(
                &ids,
                BulkOperation::ResetToDraft,
                fx.user,
                &BulkOptions::default(),
            )
            .unwrap();
        assert_eq!(unforced.total_succeeded, 0);

        let forced = fx
            .bulk
            .execute(
                &ids,
                BulkOperation::ResetToDraft,
                fx.user,
                &BulkOptions {
                    force: true,
                    reason: Some("migration replay".to_string()),
                },
            )
            .unwrap();
        assert_eq!(forced.total_succeeded, 3);
        for &id in &ids {
            assert_eq!(fx.entries.get(id).unwrap().status, EntryStatus::Draft);
        }
    }

    #[test]
    fn test_validate_for_is_read_only() {
        let fx = setup();
        let entry = draft(&fx);

        let checks = fx
            .bulk
            .validate_for(&[entry.id], BulkOperation::Approve)
            .unwrap();
        assert_eq!(checks.len(), 1);
        assert!(checks[0].can_perform);
        assert_eq!(fx.entries.get(entry.id).unwrap().status, EntryStatus::Draft);
    }

    #[test]
    fn test_report_serializes_for_api_consumers() {
        let fx = setup();
        let entry = draft(&fx);
        let report = fx
            .bulk
            .execute(
                &[entry.id, EntryId::new()],
                BulkOperation::Approve,
                fx.user,
                &BulkOptions::default(),
            )
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_requested"], 2);
        assert_eq!(json["total_succeeded"], 1);
        assert_eq!(json["failed"][0]["code"], "ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_with_config_uses_configured_chunk_size() {
        use tally_shared::config::LedgerConfig;

        let fx = setup();
        let config = LedgerConfig {
            bulk_chunk_size: 2,
            ..LedgerConfig::default()
        };
        let bulk = BulkOrchestrator::with_config(fx.store.clone(), &config);
        assert_eq!(bulk.chunk_size, 2);

        let ids: Vec<_> = (0..5).map(|_| draft(&fx).id).collect();
        let report = bulk
            .execute(&ids, BulkOperation::Approve, fx.user, &BulkOptions::default())
            .unwrap();
        assert_eq!(report.total_succeeded, 5);
    }

    #[test]
    fn test_chunked_batch_processes_everything() {
        let fx = setup();
        let bulk = BulkOrchestrator::with_chunk_size(fx.store.clone(), 10);
        let ids: Vec<_> = (0..25).map(|_| draft(&fx).id).collect();

        let report = bulk
            .execute(&ids, BulkOperation::Approve, fx.user, &BulkOptions::default())
            .unwrap();
        assert_eq!(report.total_succeeded, 25);
        assert_eq!(report.succeeded, ids);
    }
}
