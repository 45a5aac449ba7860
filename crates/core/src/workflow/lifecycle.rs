//! Lifecycle state machine for ledger entries.
//!
//! One explicit state×event table drives every status change; call sites
//! never re-derive legality with ad-hoc predicates. The valid transitions:
//!
//! - Draft → Pending (submit)
//! - Draft/Pending → Approved (approve)
//! - Approved → Posted (post)
//! - Pending/Approved → Draft (reset to draft)
//! - Posted/Cancelled → Draft (reset to draft, forced mode only)
//! - any non-Cancelled → Cancelled (cancel)

use serde::{Deserialize, Serialize};

use crate::ledger::error::LedgerError;
use crate::ledger::types::EntryStatus;

/// Lifecycle events an entry can be driven through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Submit a draft for approval.
    Submit,
    /// Approve a draft or pending entry.
    Approve,
    /// Post an approved entry to account balances.
    Post,
    /// Cancel the entry.
    Cancel,
    /// Reset the entry back to draft.
    ResetToDraft,
}

impl LifecycleEvent {
    /// The status this event moves an entry into.
    #[must_use]
    pub const fn target(self) -> EntryStatus {
        match self {
            Self::Submit => EntryStatus::Pending,
            Self::Approve => EntryStatus::Approved,
            Self::Post => EntryStatus::Posted,
            Self::Cancel => EntryStatus::Cancelled,
            Self::ResetToDraft => EntryStatus::Draft,
        }
    }
}

/// Resolves one step of the state machine.
///
/// # Errors
///
/// Returns `IllegalTransition` when the current status does not permit the
/// event. Forced resets from Posted/Cancelled are deliberately NOT part of
/// this table; see [`forced_reset_allowed`].
pub fn transition(from: EntryStatus, event: LifecycleEvent) -> Result<EntryStatus, LedgerError> {
    let legal = match event {
        LifecycleEvent::Submit => from == EntryStatus::Draft,
        LifecycleEvent::Approve => matches!(from, EntryStatus::Draft | EntryStatus::Pending),
        LifecycleEvent::Post => from == EntryStatus::Approved,
        LifecycleEvent::Cancel => from != EntryStatus::Cancelled,
        LifecycleEvent::ResetToDraft => {
            matches!(from, EntryStatus::Pending | EntryStatus::Approved)
        }
    };

    if legal {
        Ok(event.target())
    } else {
        Err(LedgerError::IllegalTransition {
            from,
            to: event.target(),
        })
    }
}

/// Whether a forced reset-to-draft may bypass the table for this status.
///
/// Posted and Cancelled entries can be reset only under the explicit forced
/// mode: it bypasses normal audit controls, requires a justification, and is
/// logged. An escape hatch, not a normal path.
#[must_use]
pub const fn forced_reset_allowed(from: EntryStatus) -> bool {
    matches!(from, EntryStatus::Posted | EntryStatus::Cancelled)
}
