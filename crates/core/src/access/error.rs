//! Access control errors.

use thiserror::Error;
use till_shared::{AppError, types::ShopId};

/// Errors raised while authorizing a shop operation.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The user may not act on the shop.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The shop does not exist.
    #[error("shop not found: {0}")]
    ShopNotFound(ShopId),

    /// Lookup failure.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AccessError {
    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::ShopNotFound(_) => "SHOP_NOT_FOUND",
            Self::Repository(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden(msg) => Self::Forbidden(msg),
            AccessError::ShopNotFound(id) => Self::NotFound(format!("Shop {id} not found")),
            AccessError::Repository(msg) => Self::Database(msg),
        }
    }
}
