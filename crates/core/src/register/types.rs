//! Register domain types.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use till_shared::types::{CashRegisterId, ShopId, UserId};

use crate::ledger::{CashMovement, RegisterTotals};
use crate::reports::DateRange;

/// Lifecycle state. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegisterStatus {
    /// Accepting movements.
    Open,
    /// Reconciled.
    Closed,
}

/// Classification of the counted-vs-expected delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceStatus {
    /// Counted cash matches.
    Exact,
    /// More cash than expected.
    Surplus,
    /// Less cash than expected.
    Shortage,
}

impl DifferenceStatus {
    /// Classifies `actual - expected`.
    #[must_use]
    pub fn classify(difference: Decimal) -> Self {
        if difference.is_zero() {
            Self::Exact
        } else if difference.is_sign_positive() {
            Self::Surplus
        } else {
            Self::Shortage
        }
    }

    /// Human label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exact => "Exact",
            Self::Surplus => "Surplus",
            Self::Shortage => "Shortage",
        }
    }
}

/// Who closed the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosingType {
    /// Closed by a person.
    #[default]
    Manual,
    /// Closed by an automated process.
    Automatic,
}

/// One physical-drawer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRegister {
    /// Register ID.
    pub id: CashRegisterId,
    /// Shop the drawer belongs to.
    pub shop_id: ShopId,
    /// Employee operating the drawer.
    pub employee_id: UserId,
    /// Lifecycle state.
    pub status: RegisterStatus,
    /// Cash in the drawer at open.
    pub opening_amount: Decimal,
    /// Expected cash, set at close.
    pub closing_amount: Option<Decimal>,
    /// Counted cash, set at close.
    pub actual_amount: Option<Decimal>,
    /// `actual_amount - closing_amount`, set at close.
    pub difference: Option<Decimal>,
    /// Open time.
    pub opened_at: DateTime<Utc>,
    /// User who opened.
    pub opened_by: UserId,
    /// Display name of the opener.
    pub opened_by_name: Option<String>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// User who closed.
    pub closed_by: Option<UserId>,
    /// Free-text notes given at close.
    pub closing_notes: Option<String>,
    /// Manual or automatic close.
    pub closing_type: Option<ClosingType>,
}

impl CashRegister {
    /// Whether the register accepts movements.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }

    /// Classification of the stored difference, once closed.
    #[must_use]
    pub fn difference_status(&self) -> Option<DifferenceStatus> {
        self.difference.map(DifferenceStatus::classify)
    }
}

/// Request to open a register.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRegisterInput {
    /// Shop to open for.
    pub shop_id: ShopId,
    /// Operator; defaults to the caller.
    #[serde(default)]
    pub employee_id: Option<UserId>,
    /// Cash placed in the drawer.
    pub opening_amount: Decimal,
}

/// Request to close a register.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseRegisterInput {
    /// Counted cash.
    pub actual_amount: Decimal,
    /// Free text.
    #[serde(default)]
    pub closing_notes: Option<String>,
    /// Manual unless an automated caller says otherwise.
    #[serde(default)]
    pub closing_type: ClosingType,
}

/// Register row to create together with its `OPENING` movement.
#[derive(Debug, Clone)]
pub struct NewRegister {
    /// Shop.
    pub shop_id: ShopId,
    /// Operator.
    pub employee_id: UserId,
    /// Opening cash.
    pub opening_amount: Decimal,
    /// Opener.
    pub opened_by: UserId,
    /// Opener display name.
    pub opened_by_name: Option<String>,
    /// Open time.
    pub opened_at: DateTime<Utc>,
}

/// Close mutation applied under the register row lock.
#[derive(Debug, Clone)]
pub struct CloseCommand {
    /// Counted cash.
    pub actual_amount: Decimal,
    /// Free text.
    pub closing_notes: Option<String>,
    /// Manual or automatic.
    pub closing_type: ClosingType,
    /// Closing user.
    pub closed_by: UserId,
    /// Close time.
    pub closed_at: DateTime<Utc>,
}

/// Optional `opened_at` window for history listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Inclusive lower bound.
    pub opened_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub opened_to: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    /// Window covering whole local days in `tz`. Either bound may be absent.
    #[must_use]
    pub fn from_local_dates(start: Option<NaiveDate>, end: Option<NaiveDate>, tz: Tz) -> Self {
        Self {
            opened_from: start.map(|date| DateRange::days(date, date).to_utc(tz).0),
            opened_to: end.map(|date| DateRange::days(date, date).to_utc(tz).1),
        }
    }

    /// Whether a register falls inside the window.
    #[must_use]
    pub fn matches(&self, register: &CashRegister) -> bool {
        self.opened_from.is_none_or(|from| register.opened_at >= from)
            && self.opened_to.is_none_or(|to| register.opened_at <= to)
    }
}

/// The open register of a shop with its live balance.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterSnapshot {
    /// The open register.
    pub register: CashRegister,
    /// Most recent movements, newest first.
    pub recent_movements: Vec<CashMovement>,
    /// Totals so far.
    pub totals: RegisterTotals,
    /// Same as `totals.expected_amount`.
    pub current_balance: Decimal,
}

/// A movement with the balance after it.
#[derive(Debug, Clone, Serialize)]
pub struct MovementLine {
    /// The movement.
    pub movement: CashMovement,
    /// Balance after applying it.
    pub running_balance: Decimal,
    /// Human-readable reference.
    pub reference: String,
}

/// Full register detail.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterDetail {
    /// The register.
    pub register: CashRegister,
    /// Movements in creation order.
    pub lines: Vec<MovementLine>,
    /// Totals.
    pub totals: RegisterTotals,
    /// Classification, once closed.
    pub difference_status: Option<DifferenceStatus>,
}
