//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;
use till_shared::{AppError, types::CashRegisterId};

use super::types::MovementType;
use crate::access::AccessError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Amounts are unsigned; the sign comes from the movement type.
    #[error("Movement amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    /// The movement type is posted by the register itself.
    #[error("Movement type {0} cannot be appended directly")]
    ReservedType(MovementType),

    /// Register not found.
    #[error("Cash register not found: {0}")]
    RegisterNotFound(CashRegisterId),

    /// Register is closed.
    #[error("Cash register {0} is not open")]
    RegisterNotOpen(CashRegisterId),

    /// Access denied or shop missing.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Persistence failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl LedgerError {
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
            Self::ReservedType(_) => "RESERVED_MOVEMENT_TYPE",
            Self::RegisterNotFound(_) => "CASH_REGISTER_NOT_FOUND",
            Self::RegisterNotOpen(_) => "CASH_REGISTER_NOT_OPEN",
            Self::Access(e) => e.error_code(),
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NegativeAmount(_) | LedgerError::ReservedType(_) => {
                Self::InvalidArgument(err.to_string())
            }
            LedgerError::RegisterNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::RegisterNotOpen(_) => Self::Conflict(err.to_string()),
            LedgerError::Access(e) => e.into(),
            LedgerError::Repository(msg) => Self::Database(msg),
        }
    }
}
