//! Property-based tests for ledger entry validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::LineInput;
use super::validation::validate_line_inputs;
use crate::store::AccountInfo;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a set of positive amounts.
fn amounts(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..=max_len)
}

fn debit_line(amount: Decimal) -> LineInput {
    LineInput {
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
    }
}

fn credit_line(amount: Decimal) -> LineInput {
    LineInput {
        credit_amount: amount,
        debit_amount: Decimal::ZERO,
        ..debit_line(Decimal::ZERO)
    }
}

fn open_account(id: AccountId) -> Result<AccountInfo, LedgerError> {
    Ok(AccountInfo {
        id,
        accepts_movements: true,
        requires_third_party: false,
        requires_cost_center: false,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of positive debit amounts, pairing them with one credit
    /// line carrying their sum yields a valid, balanced line set.
    #[test]
    fn prop_balanced_by_construction_is_valid(debits in amounts(10)) {
        let total: Decimal = debits.iter().copied().sum();
        let mut lines: Vec<LineInput> = debits.into_iter().map(debit_line).collect();
        lines.push(credit_line(total));

        let totals = validate_line_inputs(&lines, open_account);
        prop_assert!(totals.is_ok(), "expected valid line set, got {:?}", totals);
        let totals = totals.unwrap();
        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.debit, total);
    }

    /// *For any* balanced line set, perturbing one amount breaks the balance
    /// and validation rejects it.
    #[test]
    fn prop_perturbed_balance_rejected(
        amount in positive_amount(),
        delta in positive_amount(),
    ) {
        let lines = vec![debit_line(amount), credit_line(amount + delta)];
        prop_assert!(matches!(
            validate_line_inputs(&lines, open_account),
            Err(LedgerError::UnbalancedEntry { .. })
        ), "expected UnbalancedEntry");
    }

    /// *For any* line with a negative amount, validation rejects the set.
    #[test]
    fn prop_negative_amount_rejected(amount in positive_amount()) {
        let lines = vec![debit_line(-amount), credit_line(amount)];
        prop_assert!(matches!(
            validate_line_inputs(&lines, open_account),
            Err(LedgerError::NegativeAmount { .. })
        ), "expected NegativeAmount");
    }

    /// *For any* line carrying both a debit and a credit, validation rejects
    /// the set.
    #[test]
    fn prop_both_sides_rejected(amount in positive_amount()) {
        let mut both = debit_line(amount);
        both.credit_amount = amount;
        let lines = vec![both, credit_line(amount)];
        prop_assert!(matches!(
            validate_line_inputs(&lines, open_account),
            Err(LedgerError::BothSidesSet { .. })
        ), "expected BothSidesSet");
    }

    /// *For any* single line, validation rejects the set regardless of amount.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount()) {
        let lines = vec![debit_line(amount)];
        prop_assert!(matches!(
            validate_line_inputs(&lines, open_account),
            Err(LedgerError::InsufficientLines { found: 1 })
        ), "expected InsufficientLines");
    }
}
