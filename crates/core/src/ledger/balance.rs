//! Account balance propagation.
//!
//! Posting an entry applies each line's amounts to the referenced account's
//! running debit/credit totals. Propagation fires exactly once per line per
//! posting event, never for Draft/Pending/Approved entries. A reversal posts
//! through the same path (its lines already carry swapped amounts).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::entry::LedgerLine;

/// Running balance totals for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount posted to the account.
    pub debit_total: Decimal,
    /// Total credit amount posted to the account.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Creates a zeroed balance for an account.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Applies a posted line's amounts to the running totals.
    pub fn apply(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
    }

    /// Net balance (debits minus credits).
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

/// One account's delta from posting an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// The account to mutate.
    pub account_id: AccountId,
    /// Debit delta.
    pub debit: Decimal,
    /// Credit delta.
    pub credit: Decimal,
}

/// Computes per-account balance changes for a set of lines.
///
/// Changes are aggregated per account (an account referenced by several lines
/// yields one change) in first-seen line order, so the store applies each
/// account mutation exactly once per posting event.
#[must_use]
pub fn propagation(lines: &[LedgerLine]) -> Vec<BalanceChange> {
    let mut changes: Vec<BalanceChange> = Vec::new();

    for line in lines {
        match changes.iter_mut().find(|c| c.account_id == line.account_id) {
            Some(change) => {
                change.debit += line.debit_amount;
                change.credit += line.credit_amount;
            }
            None => changes.push(BalanceChange {
                account_id: line.account_id,
                debit: line.debit_amount,
                credit: line.credit_amount,
            }),
        }
    }

    changes
}
