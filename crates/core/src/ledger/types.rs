//! Movement ledger domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use till_shared::types::{CashMovementId, CashRegisterId, ShopId, UserId};
use uuid::Uuid;

/// Kind of monetary event posted against a register.
///
/// Amounts are stored unsigned; the direction comes from the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Cash placed in the drawer when the register is opened.
    Opening,
    /// Completed sale.
    Sale,
    /// Other cash income.
    Income,
    /// Cash deposited into the drawer.
    Deposit,
    /// Purchase paid from the drawer.
    Purchase,
    /// Customer refund.
    Return,
    /// Expense paid from the drawer.
    Expense,
    /// Cash taken out of the drawer.
    Withdrawal,
    /// Informational correction. Never moves the balance.
    Adjustment,
}

impl MovementType {
    /// All movement types.
    pub const ALL: [Self; 9] = [
        Self::Opening,
        Self::Sale,
        Self::Income,
        Self::Deposit,
        Self::Purchase,
        Self::Return,
        Self::Expense,
        Self::Withdrawal,
        Self::Adjustment,
    ];

    /// Direction of the movement: `+1`, `-1` or `0`.
    ///
    /// `OPENING` is zero because it seeds the opening amount directly.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Sale | Self::Income | Self::Deposit => 1,
            Self::Purchase | Self::Return | Self::Expense | Self::Withdrawal => -1,
            Self::Opening | Self::Adjustment => 0,
        }
    }

    /// `sign(type) * amount`.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self.sign() {
            1 => amount,
            -1 => -amount,
            _ => Decimal::ZERO,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "OPENING",
            Self::Sale => "SALE",
            Self::Income => "INCOME",
            Self::Deposit => "DEPOSIT",
            Self::Purchase => "PURCHASE",
            Self::Return => "RETURN",
            Self::Expense => "EXPENSE",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Adjustment => "ADJUSTMENT",
        }
    }

    /// Human label used on statements.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Opening => "Opening balance",
            Self::Sale => "Sale",
            Self::Income => "Income",
            Self::Deposit => "Deposit",
            Self::Purchase => "Purchase",
            Self::Return => "Return",
            Self::Expense => "Expense",
            Self::Withdrawal => "Withdrawal",
            Self::Adjustment => "Adjustment",
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown movement type: {s}"))
    }
}

/// Subsystem record a movement originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginKind {
    /// A sale document.
    Sale,
    /// A purchase document.
    Purchase,
    /// A customer return.
    Return,
    /// An income record.
    Income,
    /// An expense record.
    Expense,
}

impl OriginKind {
    /// Human label used in references.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sale => "Sale",
            Self::Purchase => "Purchase",
            Self::Return => "Return",
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

/// Informational link to the record that produced a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginRef {
    /// Producing subsystem.
    pub kind: OriginKind,
    /// Record ID inside that subsystem.
    pub id: Uuid,
}

impl OriginRef {
    /// Short reference such as `Sale #abcd1234`.
    #[must_use]
    pub fn reference(&self) -> String {
        let simple = self.id.simple().to_string();
        format!("{} #{}", self.kind.label(), &simple[..8])
    }
}

/// One signed monetary event bound to a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashMovement {
    /// Movement ID.
    pub id: CashMovementId,
    /// Register the movement belongs to.
    pub cash_register_id: CashRegisterId,
    /// Shop of the register.
    pub shop_id: ShopId,
    /// Movement kind.
    pub movement_type: MovementType,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Free text.
    pub description: String,
    /// Actor that posted the movement.
    pub user_id: UserId,
    /// Producing record, if any.
    pub origin: Option<OriginRef>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    /// Contribution of this movement to the expected amount.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.movement_type.signed(self.amount)
    }

    /// Human-readable reference, falling back to the description.
    #[must_use]
    pub fn reference(&self) -> String {
        match self.origin {
            Some(origin) => origin.reference(),
            None if !self.description.trim().is_empty() => self.description.trim().to_string(),
            None => self.movement_type.label().to_string(),
        }
    }
}

/// Request to append a movement.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendMovementInput {
    /// Movement kind. `OPENING` is reserved for register opening.
    pub movement_type: MovementType,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Producing record, if any.
    #[serde(default)]
    pub origin: Option<OriginRef>,
}

/// Fully resolved movement handed to the repository.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// Target register.
    pub cash_register_id: CashRegisterId,
    /// Shop of the register.
    pub shop_id: ShopId,
    /// Movement kind.
    pub movement_type: MovementType,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Free text.
    pub description: String,
    /// Actor.
    pub user_id: UserId,
    /// Producing record, if any.
    pub origin: Option<OriginRef>,
}
