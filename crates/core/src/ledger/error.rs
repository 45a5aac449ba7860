//! Ledger error types for validation, state, and business rule errors.
//!
//! One taxonomy covers the whole core: validation errors (malformed input or
//! invariant violated), illegal state transitions, not-found errors, business
//! rule violations, number conflicts, and infrastructure failures. Bulk flows
//! surface these per item; infrastructure failures abort the batch.

use rust_decimal::Decimal;
use thiserror::Error;

use tally_shared::error::AppError;
use tally_shared::types::{AccountId, EntryId, JournalId};

use super::types::EntryStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Entry must have at least 2 lines, found {found}")]
    InsufficientLines {
        /// Number of lines provided.
        found: usize,
    },

    /// Entry is not balanced (debits != credits).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line carries a negative amount.
    #[error("Line {line} has a negative amount")]
    NegativeAmount {
        /// The offending line number.
        line: u32,
    },

    /// A line sets both debit and credit.
    #[error("Line {line} must be either debit or credit, not both")]
    BothSidesSet {
        /// The offending line number.
        line: u32,
    },

    /// A line sets neither debit nor credit.
    #[error("Line {line} must carry a debit or credit amount")]
    NoSideSet {
        /// The offending line number.
        line: u32,
    },

    /// A reason string is required for this operation.
    #[error("A reason is required for this operation")]
    ReasonRequired,

    // ========== Account / Business Rule Errors ==========
    /// Account does not accept direct postings (non-leaf or movement-disabled).
    #[error("Account {0} does not accept postings")]
    AccountNotPostable(AccountId),

    /// Account requires a third-party reference on the line.
    #[error("Account {account} requires a third party on line {line}")]
    ThirdPartyRequired {
        /// The account demanding the reference.
        account: AccountId,
        /// The offending line number.
        line: u32,
    },

    /// Account requires a cost-center reference on the line.
    #[error("Account {account} requires a cost center on line {line}")]
    CostCenterRequired {
        /// The account demanding the reference.
        account: AccountId,
        /// The offending line number.
        line: u32,
    },

    /// The entry has already been reversed.
    #[error("Entry has already been reversed as {number}")]
    AlreadyReversed {
        /// The existing reversal entry number.
        number: String,
    },

    /// Reversal entries cannot themselves be reversed.
    #[error("Entry {0} is a reversal and cannot be reversed")]
    CannotReverseReversal(EntryId),

    // ========== State Errors ==========
    /// Attempted an invalid status transition.
    #[error("Illegal state transition from {from} to {to}")]
    IllegalTransition {
        /// The current status.
        from: EntryStatus,
        /// The attempted target status.
        to: EntryStatus,
    },

    /// Entry is not editable in its current status.
    #[error("Entry cannot be modified while {0}")]
    NotEditable(EntryStatus),

    /// Only draft entries can be deleted.
    #[error("Only draft entries can be deleted, entry is {0}")]
    OnlyDraftDeletable(EntryStatus),

    // ========== Not Found ==========
    /// Entry not found.
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    // ========== Conflicts ==========
    /// An entry with this number already exists.
    #[error("Duplicate entry number: {0}")]
    DuplicateNumber(String),

    // ========== Infrastructure ==========
    /// Storage or transaction failure; fatal for the current batch.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSidesSet { .. } => "BOTH_SIDES_SET",
            Self::NoSideSet { .. } => "NO_SIDE_SET",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::AccountNotPostable(_) => "ACCOUNT_NOT_POSTABLE",
            Self::ThirdPartyRequired { .. } => "THIRD_PARTY_REQUIRED",
            Self::CostCenterRequired { .. } => "COST_CENTER_REQUIRED",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::CannotReverseReversal(_) => "CANNOT_REVERSE_REVERSAL",
            Self::IllegalTransition { .. } => "ILLEGAL_STATE_TRANSITION",
            Self::NotEditable(_) => "NOT_EDITABLE",
            Self::OnlyDraftDeletable(_) => "ONLY_DRAFT_DELETABLE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::DuplicateNumber(_) => "DUPLICATE_NUMBER",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and state errors
            Self::InsufficientLines { .. }
            | Self::UnbalancedEntry { .. }
            | Self::NegativeAmount { .. }
            | Self::BothSidesSet { .. }
            | Self::NoSideSet { .. }
            | Self::ReasonRequired
            | Self::IllegalTransition { .. }
            | Self::NotEditable(_)
            | Self::OnlyDraftDeletable(_) => 400,

            // 404 Not Found
            Self::EntryNotFound(_) | Self::AccountNotFound(_) | Self::JournalNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateNumber(_) => 409,

            // 422 Unprocessable - cross-entity business rules
            Self::AccountNotPostable(_)
            | Self::ThirdPartyRequired { .. }
            | Self::CostCenterRequired { .. }
            | Self::AlreadyReversed { .. }
            | Self::CannotReverseReversal(_) => 422,

            // 500 Internal Server Error
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if this error can never be overridden by `force` in bulk
    /// operations: missing entities and detected double reversals.
    #[must_use]
    pub const fn is_hard_block(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound(_)
                | Self::AccountNotFound(_)
                | Self::JournalNotFound(_)
                | Self::AlreadyReversed { .. }
        )
    }

    /// Returns true if this is an infrastructure failure that should abort a
    /// whole batch rather than be reported per item.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Maps the precise ledger taxonomy onto the coarse application one at the
/// service boundary.
impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::InsufficientLines { .. }
            | LedgerError::UnbalancedEntry { .. }
            | LedgerError::NegativeAmount { .. }
            | LedgerError::BothSidesSet { .. }
            | LedgerError::NoSideSet { .. }
            | LedgerError::ReasonRequired => Self::Validation(message),

            LedgerError::IllegalTransition { .. }
            | LedgerError::NotEditable(_)
            | LedgerError::OnlyDraftDeletable(_) => Self::IllegalStateTransition(message),

            LedgerError::AccountNotPostable(_)
            | LedgerError::ThirdPartyRequired { .. }
            | LedgerError::CostCenterRequired { .. }
            | LedgerError::AlreadyReversed { .. }
            | LedgerError::CannotReverseReversal(_) => Self::BusinessRule(message),

            LedgerError::EntryNotFound(_)
            | LedgerError::AccountNotFound(_)
            | LedgerError::JournalNotFound(_) => Self::NotFound(message),

            LedgerError::DuplicateNumber(_) => Self::Conflict(message),

            LedgerError::Storage(_) => Self::Infrastructure(message),
        }
    }
}
