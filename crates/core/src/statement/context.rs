//! Data handed to renderers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::access::Shop;
use crate::ledger::{MovementType, RegisterTotals, running_balances};
use crate::register::{CashRegister, ClosedRegister, DifferenceStatus};

/// One row of the movement table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    /// Posting time.
    pub created_at: DateTime<Utc>,
    /// Kind.
    pub movement_type: MovementType,
    /// Human reference ("Sale #abcd1234" or the description).
    pub reference: String,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Amount with the movement's sign applied.
    pub signed_amount: Decimal,
    /// Balance after this row.
    pub running_balance: Decimal,
}

/// Everything a renderer needs for one statement.
#[derive(Debug, Clone)]
pub struct StatementContext {
    /// The closed register.
    pub register: CashRegister,
    /// Its shop; `currency` drives money formatting.
    pub shop: Shop,
    /// Ledger totals.
    pub totals: RegisterTotals,
    /// Reconciliation class.
    pub difference_status: Option<DifferenceStatus>,
    /// Movements in creation order.
    pub lines: Vec<StatementLine>,
    /// Render time.
    pub generated_at: DateTime<Utc>,
}

impl StatementContext {
    /// Builds the context from a loaded register.
    #[must_use]
    pub fn from_closed(closed: ClosedRegister, generated_at: DateTime<Utc>) -> Self {
        let ClosedRegister {
            register,
            shop,
            movements,
        } = closed;

        let totals = RegisterTotals::compute(register.opening_amount, &movements);
        let balances = running_balances(register.opening_amount, &movements);
        let lines = movements
            .iter()
            .zip(balances)
            .map(|(m, running_balance)| StatementLine {
                created_at: m.created_at,
                movement_type: m.movement_type,
                reference: m.reference(),
                amount: m.amount,
                signed_amount: m.signed_amount(),
                running_balance,
            })
            .collect();

        Self {
            difference_status: register.difference_status(),
            register,
            shop,
            totals,
            lines,
            generated_at,
        }
    }

    /// Shop currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.shop.currency
    }
}
