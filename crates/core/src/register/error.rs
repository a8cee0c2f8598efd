//! Register error types.

use rust_decimal::Decimal;
use thiserror::Error;
use till_shared::{
    AppError,
    types::{CashRegisterId, ShopId},
};

use crate::access::AccessError;
use crate::ledger::LedgerError;

/// Errors raised by the register state machine.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Opening or counted amounts must be non-negative.
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// Register not found.
    #[error("Cash register not found: {0}")]
    NotFound(CashRegisterId),

    /// The shop already has an open register.
    #[error("Shop {0} already has an open cash register")]
    AlreadyOpen(ShopId),

    /// The register was already closed.
    #[error("Cash register {0} is not open")]
    NotOpen(CashRegisterId),

    /// The operation requires a closed register.
    #[error("Cash register {0} is not closed yet")]
    NotClosed(CashRegisterId),

    /// Bad date window.
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Access denied or shop missing.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Persistence failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl RegisterError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::NotFound(_) => "CASH_REGISTER_NOT_FOUND",
            Self::AlreadyOpen(_) => "CASH_REGISTER_ALREADY_OPEN",
            Self::NotOpen(_) => "CASH_REGISTER_NOT_OPEN",
            Self::NotClosed(_) => "CASH_REGISTER_NOT_CLOSED",
            Self::InvalidRange(_) => "INVALID_DATE_RANGE",
            Self::Access(e) => e.error_code(),
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NegativeAmount(_) | Self::InvalidRange(_) => 400,
            Self::NotFound(_) | Self::Access(AccessError::ShopNotFound(_)) => 404,
            Self::Access(AccessError::Forbidden(_)) => 403,
            Self::AlreadyOpen(_) | Self::NotOpen(_) | Self::NotClosed(_) => 409,
            Self::Access(AccessError::Repository(_)) | Self::Repository(_) => 500,
        }
    }
}

impl From<LedgerError> for RegisterError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::RegisterNotFound(id) => Self::NotFound(id),
            LedgerError::RegisterNotOpen(id) => Self::NotOpen(id),
            LedgerError::NegativeAmount(amount) => Self::NegativeAmount(amount),
            LedgerError::Access(e) => Self::Access(e),
            other => Self::Repository(other.to_string()),
        }
    }
}

impl From<RegisterError> for AppError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::NegativeAmount(_) | RegisterError::InvalidRange(_) => {
                Self::InvalidArgument(err.to_string())
            }
            RegisterError::NotFound(_) => Self::NotFound(err.to_string()),
            RegisterError::AlreadyOpen(_)
            | RegisterError::NotOpen(_)
            | RegisterError::NotClosed(_) => Self::Conflict(err.to_string()),
            RegisterError::Access(e) => e.into(),
            RegisterError::Repository(msg) => Self::Database(msg),
        }
    }
}
