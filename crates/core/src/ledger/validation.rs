//! Business rule validation for ledger entries.
//!
//! Validation runs at creation, on full line replacement, and again at
//! approve/post time: the double-entry invariants hold always, not just at
//! transition time.

use rust_decimal::Decimal;

use tally_shared::types::AccountId;

use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::types::{EntryTotals, LineInput};
use crate::store::AccountInfo;

/// Validates a replacement/creation line set and returns its totals.
///
/// Checks, in order:
/// 1. At least 2 lines
/// 2. Per line: amounts non-negative, exactly one of debit/credit positive
/// 3. Per line: account accepts postings; required third-party/cost-center
///    references populated
/// 4. Sum of debits equals sum of credits
///
/// # Errors
///
/// Returns the first violated rule as a `LedgerError`.
pub fn validate_line_inputs<A>(
    lines: &[LineInput],
    account_lookup: A,
) -> Result<EntryTotals, LedgerError>
where
    A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
{
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines { found: lines.len() });
    }

    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for (index, line) in lines.iter().enumerate() {
        let line_number = index as u32 + 1;
        check_amounts(line_number, line.debit_amount, line.credit_amount)?;

        let account = account_lookup(line.account_id)?;
        check_account_rules(
            &account,
            line_number,
            line.third_party_id.is_some(),
            line.cost_center_id.is_some(),
        )?;

        total_debit += line.debit_amount;
        total_credit += line.credit_amount;
    }

    let totals = EntryTotals::new(total_debit, total_credit);
    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}

/// Re-validates a stored entry's invariants, as required before approve/post.
///
/// # Errors
///
/// Returns the first violated rule as a `LedgerError`.
pub fn validate_entry<A>(entry: &LedgerEntry, account_lookup: A) -> Result<EntryTotals, LedgerError>
where
    A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
{
    if entry.lines.len() < 2 {
        return Err(LedgerError::InsufficientLines {
            found: entry.lines.len(),
        });
    }

    for line in &entry.lines {
        check_amounts(line.line_number, line.debit_amount, line.credit_amount)?;

        let account = account_lookup(line.account_id)?;
        check_account_rules(
            &account,
            line.line_number,
            line.third_party_id.is_some(),
            line.cost_center_id.is_some(),
        )?;
    }

    let totals = entry.compute_totals();
    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}

/// Enforces the one-sided-amount rule: exactly one of debit/credit positive,
/// both non-negative.
fn check_amounts(line_number: u32, debit: Decimal, credit: Decimal) -> Result<(), LedgerError> {
    if debit < Decimal::ZERO || credit < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount { line: line_number });
    }
    match (debit > Decimal::ZERO, credit > Decimal::ZERO) {
        (true, true) => Err(LedgerError::BothSidesSet { line: line_number }),
        (false, false) => Err(LedgerError::NoSideSet { line: line_number }),
        _ => Ok(()),
    }
}

/// Enforces account-level posting rules for one line.
fn check_account_rules(
    account: &AccountInfo,
    line_number: u32,
    has_third_party: bool,
    has_cost_center: bool,
) -> Result<(), LedgerError> {
    if !account.accepts_movements {
        return Err(LedgerError::AccountNotPostable(account.id));
    }
    if account.requires_third_party && !has_third_party {
        return Err(LedgerError::ThirdPartyRequired {
            account: account.id,
            line: line_number,
        });
    }
    if account.requires_cost_center && !has_cost_center {
        return Err(LedgerError::CostCenterRequired {
            account: account.id,
            line: line_number,
        });
    }
    Ok(())
}
