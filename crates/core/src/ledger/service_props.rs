//! Property-based tests for ledger arithmetic.
//!
//! - Expected amount equals opening plus the signed movement sum
//! - The last running balance equals the expected amount
//! - Reconciliation classification is exhaustive and exclusive

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{RegisterTotals, expected_amount, running_balances};
use super::types::MovementType;
use crate::register::{DifferenceStatus, Reconciliation};
use crate::testing::movement;

/// Strategy to generate non-negative amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate any movement type.
fn movement_type() -> impl Strategy<Value = MovementType> {
    proptest::sample::select(MovementType::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_expected_amount_is_opening_plus_signed_sum(
        opening in amount(),
        raw in prop::collection::vec((movement_type(), amount()), 0..40),
    ) {
        let movements: Vec<_> = raw.iter().map(|(t, a)| movement(*t, *a)).collect();
        let signed: Decimal = raw
            .iter()
            .filter(|(t, _)| *t != MovementType::Opening)
            .map(|(t, a)| Decimal::from(t.sign()) * *a)
            .sum();

        let totals = RegisterTotals::compute(opening, &movements);
        prop_assert_eq!(totals.expected_amount, opening + signed);
        prop_assert_eq!(totals.expected_amount, expected_amount(opening, &movements));
        prop_assert_eq!(totals.net_income, totals.total_income - totals.total_expense);
    }

    #[test]
    fn prop_last_running_balance_is_expected_amount(
        opening in amount(),
        raw in prop::collection::vec((movement_type(), amount()), 1..40),
    ) {
        let movements: Vec<_> = raw.iter().map(|(t, a)| movement(*t, *a)).collect();
        let balances = running_balances(opening, &movements);
        prop_assert_eq!(balances.len(), movements.len());
        prop_assert_eq!(balances.last().copied(), Some(expected_amount(opening, &movements)));
    }

    #[test]
    fn prop_classification_exhaustive_and_exclusive(
        expected in -1_000_000i64..1_000_000i64,
        actual in 0i64..1_000_000i64,
    ) {
        let expected = Decimal::new(expected, 2);
        let actual = Decimal::new(actual, 2);
        let rec = Reconciliation::from_expected(expected, actual);

        let by_order = match actual.cmp(&expected) {
            std::cmp::Ordering::Equal => DifferenceStatus::Exact,
            std::cmp::Ordering::Greater => DifferenceStatus::Surplus,
            std::cmp::Ordering::Less => DifferenceStatus::Shortage,
        };
        prop_assert_eq!(rec.status, by_order);
        prop_assert_eq!(rec.difference, actual - expected);
    }
}
