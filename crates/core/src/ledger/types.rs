//! Ledger domain types for entry creation and validation.
//!
//! This module defines the core types used for creating and validating
//! ledger entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{
    AccountId, CostCenterId, PaymentTermId, ProductId, ThirdPartyId, UserId,
};

/// Entry kind classification.
///
/// Categorizes entries for numbering and workflow purposes. Each kind owns
/// its own number sequence per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Manually captured journal entry.
    Manual,
    /// System-generated entry (e.g. from a posting feed).
    Automatic,
    /// Adjustment entry.
    Adjustment,
    /// Opening balance entry.
    Opening,
    /// Closing entry.
    Closing,
    /// Reversal of a previously posted entry.
    Reversal,
}

impl EntryKind {
    /// Returns the fixed prefix used by this kind's number sequence.
    #[must_use]
    pub const fn sequence_prefix(self) -> &'static str {
        match self {
            Self::Manual => "MAN",
            Self::Automatic => "AUT",
            Self::Adjustment => "ADJ",
            Self::Opening => "OPN",
            Self::Closing => "CLS",
            Self::Reversal => "REV",
        }
    }
}

/// Business origin of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Sales document.
    Sale,
    /// Purchase document.
    Purchase,
    /// Outgoing payment.
    Payment,
    /// Incoming collection.
    Collection,
    /// Adjustment.
    Adjustment,
    /// Transfer between accounts.
    Transfer,
    /// Opening balances.
    Opening,
    /// Closing entries.
    Closing,
    /// Anything else.
    Other,
}

/// Entry status in the approval workflow.
///
/// Entries progress through these states from creation to posting.
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Draft/Pending → Approved (approve)
/// - Approved → Posted (post)
/// - Pending/Approved → Draft (reset to draft)
/// - any non-Cancelled → Cancelled (cancel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry has been submitted for approval; still editable.
    Pending,
    /// Entry has been approved and is ready for posting.
    Approved,
    /// Entry has been posted to account balances (immutable).
    Posted,
    /// Entry has been cancelled (immutable, retained for audit).
    Cancelled,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "posted" => Some(Self::Posted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the entry can be modified (including line replacement).
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// Returns true if the entry is immutable.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        matches!(self, Self::Posted | Self::Cancelled)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for a single line in a new or replaced entry.
#[derive(Debug, Clone)]
pub struct LineInput {
    /// The account to post to.
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
    /// Optional due date for the line.
    pub due_date: Option<NaiveDate>,
    /// Optional payment-terms reference (may coexist with `due_date`).
    pub payment_term_id: Option<PaymentTermId>,
    /// Free-form reference text.
    pub reference: Option<String>,
}

/// Input for creating a new ledger entry.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// The kind of entry.
    pub kind: EntryKind,
    /// The business origin, if known.
    pub origin: Option<EntryOrigin>,
    /// The date of the entry.
    pub entry_date: NaiveDate,
    /// Optional notes.
    pub notes: Option<String>,
    /// Optional external document reference.
    pub external_reference: Option<String>,
    /// The lines (must have at least 2).
    pub lines: Vec<LineInput>,
    /// The user creating the entry.
    pub created_by: UserId,
}

/// Patch for updating a Draft/Pending entry.
///
/// `lines: Some(..)` replaces the full line set (never merges) and re-runs
/// creation validation.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    /// New entry date.
    pub entry_date: Option<NaiveDate>,
    /// New business origin.
    pub origin: Option<EntryOrigin>,
    /// New notes.
    pub notes: Option<String>,
    /// New external reference.
    pub external_reference: Option<String>,
    /// Full replacement line set.
    pub lines: Option<Vec<LineInput>>,
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Copy)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the entry is balanced (debits == credits).
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates new entry totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}
