//! Closed-register reports.
//!
//! - period and range resolution (`day`, `week`, `month`, `year`)
//! - closed-register listings across the caller's shops

pub mod error;
pub mod period;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use period::{DateRange, MAX_YEAR, MIN_YEAR, RangeParams, RangeResolver, ReportPeriod, parse_date};
pub use service::ReportService;
pub use types::{ClosedRegisterReport, EMPTY_REPORT_MESSAGE, RegisterSummary};
