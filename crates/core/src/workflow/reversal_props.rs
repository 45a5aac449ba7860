//! Property-based tests for the reversal engine.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use tally_shared::types::{AccountId, EntryId, UserId};

use crate::ledger::balance::propagation;
use crate::ledger::entry::{LedgerEntry, LedgerLine};
use crate::ledger::types::{EntryKind, EntryStatus};

use super::reversal::build_reversal;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Builds a posted entry from debit amounts, balanced by one credit line.
fn posted_from_debits(debits: &[Decimal]) -> LedgerEntry {
    let total: Decimal = debits.iter().copied().sum();
    let by = UserId::new();
    let mut lines: Vec<LedgerLine> = debits
        .iter()
        .enumerate()
        .map(|(index, &amount)| LedgerLine {
            line_number: index as u32 + 1,
            account_id: AccountId::new(),
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
            third_party_id: None,
            cost_center_id: None,
            product_id: None,
            due_date: None,
            payment_term_id: None,
            reference: None,
        })
        .collect();
    lines.push(LedgerLine {
        line_number: debits.len() as u32 + 1,
        account_id: AccountId::new(),
        debit_amount: Decimal::ZERO,
        credit_amount: total,
        description: None,
        third_party_id: None,
        cost_center_id: None,
        product_id: None,
        due_date: None,
        payment_term_id: None,
        reference: None,
    });

    LedgerEntry {
        id: EntryId::new(),
        number: "MAN/2026/00001".to_string(),
        kind: EntryKind::Manual,
        origin: None,
        entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        status: EntryStatus::Posted,
        total_debit: total,
        total_credit: total,
        created_by: by,
        created_at: Utc::now(),
        approved_by: Some(by),
        approved_at: Some(Utc::now()),
        posted_by: Some(by),
        posted_at: Some(Utc::now()),
        posting_date: NaiveDate::from_ymd_opt(2026, 1, 15),
        cancelled_by: None,
        cancelled_at: None,
        notes: None,
        external_reference: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* balanced posted entry, its reversal is balanced with
    /// transposed totals.
    #[test]
    fn prop_reversal_balanced_with_transposed_totals(
        debits in prop::collection::vec(positive_amount(), 1..10)
    ) {
        let original = posted_from_debits(&debits);
        let reversal =
            build_reversal(&original, UserId::new(), "correction", Utc::now()).unwrap();

        let totals = reversal.compute_totals();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(reversal.total_debit, original.total_credit);
        prop_assert_eq!(reversal.total_credit, original.total_debit);
    }

    /// *For any* posted entry, the balance changes of the entry plus its
    /// reversal net to zero on every account.
    #[test]
    fn prop_entry_plus_reversal_nets_to_zero(
        debits in prop::collection::vec(positive_amount(), 1..10)
    ) {
        let original = posted_from_debits(&debits);
        let reversal =
            build_reversal(&original, UserId::new(), "correction", Utc::now()).unwrap();

        for (fwd, rev) in propagation(&original.lines)
            .iter()
            .zip(propagation(&reversal.lines).iter())
        {
            prop_assert_eq!(fwd.account_id, rev.account_id);
            prop_assert_eq!(fwd.debit - rev.credit, Decimal::ZERO);
            prop_assert_eq!(fwd.credit - rev.debit, Decimal::ZERO);
        }
    }

    /// *For any* posted entry, every reversal line swaps sides and keeps the
    /// account.
    #[test]
    fn prop_every_line_swaps_sides(
        debits in prop::collection::vec(positive_amount(), 1..10)
    ) {
        let original = posted_from_debits(&debits);
        let reversal =
            build_reversal(&original, UserId::new(), "correction", Utc::now()).unwrap();

        prop_assert_eq!(reversal.lines.len(), original.lines.len());
        for (orig, rev) in original.lines.iter().zip(reversal.lines.iter()) {
            prop_assert_eq!(orig.account_id, rev.account_id);
            prop_assert_eq!(orig.debit_amount, rev.credit_amount);
            prop_assert_eq!(orig.credit_amount, rev.debit_amount);
        }
    }
}
