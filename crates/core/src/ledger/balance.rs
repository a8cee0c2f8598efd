//! Signed totals and running balances over a register's movements.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{CashMovement, MovementType};

/// Per-type sums and the derived reconciliation figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegisterTotals {
    /// Sum of `SALE` amounts.
    pub sales: Decimal,
    /// Sum of `INCOME` amounts.
    pub incomes: Decimal,
    /// Sum of `DEPOSIT` amounts.
    pub deposits: Decimal,
    /// Sum of `PURCHASE` amounts.
    pub purchases: Decimal,
    /// Sum of `RETURN` amounts.
    pub returns: Decimal,
    /// Sum of `EXPENSE` amounts.
    pub expenses: Decimal,
    /// Sum of `WITHDRAWAL` amounts.
    pub withdrawals: Decimal,
    /// `sales + incomes + deposits`.
    pub total_income: Decimal,
    /// `purchases + returns + expenses + withdrawals`.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub net_income: Decimal,
    /// `opening_amount + sum(sign * amount)` excluding `OPENING`.
    pub expected_amount: Decimal,
}

impl RegisterTotals {
    /// Computes totals for a register opened with `opening_amount`.
    #[must_use]
    pub fn compute(opening_amount: Decimal, movements: &[CashMovement]) -> Self {
        let mut totals = Self::default();
        for movement in movements {
            let slot = match movement.movement_type {
                MovementType::Sale => &mut totals.sales,
                MovementType::Income => &mut totals.incomes,
                MovementType::Deposit => &mut totals.deposits,
                MovementType::Purchase => &mut totals.purchases,
                MovementType::Return => &mut totals.returns,
                MovementType::Expense => &mut totals.expenses,
                MovementType::Withdrawal => &mut totals.withdrawals,
                MovementType::Opening | MovementType::Adjustment => continue,
            };
            *slot += movement.amount;
        }

        totals.total_income = totals.sales + totals.incomes + totals.deposits;
        totals.total_expense =
            totals.purchases + totals.returns + totals.expenses + totals.withdrawals;
        totals.net_income = totals.total_income - totals.total_expense;
        totals.expected_amount = expected_amount(opening_amount, movements);
        totals
    }
}

/// `opening_amount + sum(sign(type) * amount)` over all non-`OPENING` movements.
#[must_use]
pub fn expected_amount(opening_amount: Decimal, movements: &[CashMovement]) -> Decimal {
    movements
        .iter()
        .filter(|m| m.movement_type != MovementType::Opening)
        .fold(opening_amount, |acc, m| acc + m.signed_amount())
}

/// Balance after each movement, for statements.
///
/// `movements` must be in creation order. The sum is seeded at `opening_amount`;
/// the `OPENING` row shows that seed without adding to it.
#[must_use]
pub fn running_balances(opening_amount: Decimal, movements: &[CashMovement]) -> Vec<Decimal> {
    movements
        .iter()
        .scan(opening_amount, |balance, m| {
            if m.movement_type != MovementType::Opening {
                *balance += m.signed_amount();
            }
            Some(*balance)
        })
        .collect()
}

/// Sorts movements into creation order, ties broken by ID.
pub fn sort_chronologically(movements: &mut [CashMovement]) {
    movements.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.into_inner().cmp(&b.id.into_inner()))
    });
}
