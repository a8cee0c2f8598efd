//! Report types.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use till_shared::types::{CashRegisterId, ShopId, UserId};

use super::period::ReportPeriod;
use crate::register::{ClosingType, DifferenceStatus};

/// Shown when a window contains no closed registers.
pub const EMPTY_REPORT_MESSAGE: &str = "No closed cash registers found for the selected period";

/// One closed register in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterSummary {
    /// Register.
    pub id: CashRegisterId,
    /// Shop.
    pub shop_id: ShopId,
    /// Shop name.
    pub shop_name: String,
    /// Shop currency.
    pub currency: String,
    /// Employee in charge.
    pub employee_id: UserId,
    /// Opening time.
    pub opened_at: DateTime<Utc>,
    /// Closing time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Seed amount.
    pub opening_amount: Decimal,
    /// Expected amount.
    pub closing_amount: Option<Decimal>,
    /// Counted amount.
    pub actual_amount: Option<Decimal>,
    /// Counted minus expected.
    pub difference: Option<Decimal>,
    /// Reconciliation class.
    pub difference_status: Option<DifferenceStatus>,
    /// Manual or automatic.
    pub closing_type: Option<ClosingType>,
}

/// Closed registers across the caller's shops for one window.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedRegisterReport {
    /// Requested period.
    pub period: ReportPeriod,
    /// Local window start.
    pub start: NaiveDateTime,
    /// Local window end.
    pub end: NaiveDateTime,
    /// Registers, newest close first.
    pub registers: Vec<RegisterSummary>,
    /// Present when `registers` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
