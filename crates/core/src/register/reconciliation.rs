//! Close-time reconciliation of counted against expected cash.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::DifferenceStatus;
use crate::ledger::{CashMovement, expected_amount};

/// Result of reconciling a drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Expected cash: opening plus the signed movement sum.
    pub closing_amount: Decimal,
    /// Counted cash.
    pub actual_amount: Decimal,
    /// `actual_amount - closing_amount`.
    pub difference: Decimal,
    /// Classification of `difference`.
    pub status: DifferenceStatus,
}

impl Reconciliation {
    /// Reconciles `actual_amount` against the register's movement set.
    #[must_use]
    pub fn compute(
        opening_amount: Decimal,
        movements: &[CashMovement],
        actual_amount: Decimal,
    ) -> Self {
        Self::from_expected(expected_amount(opening_amount, movements), actual_amount)
    }

    /// Reconciles against an already computed expectation.
    #[must_use]
    pub fn from_expected(closing_amount: Decimal, actual_amount: Decimal) -> Self {
        let difference = actual_amount - closing_amount;
        Self {
            closing_amount,
            actual_amount,
            difference,
            status: DifferenceStatus::classify(difference),
        }
    }
}
