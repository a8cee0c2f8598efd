//! Report error types.

use chrono::NaiveDateTime;
use thiserror::Error;
use till_shared::AppError;

use crate::access::AccessError;
use crate::register::RegisterError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Period outside `day | week | month | year`.
    #[error("Invalid period: {0}. Expected day, week, month or year")]
    InvalidPeriod(String),

    /// A parameter the period needs was not given.
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Unparseable date.
    #[error("Invalid date: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Month outside 1-12.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// Year outside 1900-9999.
    #[error("Invalid year: {0}")]
    InvalidYear(String),

    /// ISO week that does not exist in the year.
    #[error("Invalid week: {0}")]
    InvalidWeek(String),

    /// The window starts after now.
    #[error("Date range starts in the future: {0}")]
    FutureRange(NaiveDateTime),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start.
        start: NaiveDateTime,
        /// End.
        end: NaiveDateTime,
    },

    /// Access lookup failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Register lookup failed.
    #[error(transparent)]
    Register(#[from] RegisterError),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::InvalidDate(_)
            | Self::InvalidMonth(_)
            | Self::InvalidYear(_)
            | Self::InvalidWeek(_) => "INVALID_DATE",
            Self::FutureRange(_) | Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Access(e) => e.error_code(),
            Self::Register(e) => e.error_code(),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Access(e) => e.into(),
            ReportError::Register(e) => e.into(),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}
