//! Export error types.

use thiserror::Error;
use till_shared::AppError;

use crate::register::RegisterError;
use crate::statement::RenderError;
use crate::storage::StorageError;

/// Errors that can occur while producing or maintaining exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The register precondition failed (missing, forbidden, not closed).
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// Renderer failure.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Blob store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Rendering or blob I/O did not finish in time.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Metadata persistence failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl ExportError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Register(e) => e.error_code(),
            Self::Render(_) | Self::Storage(_) | Self::Timeout(_) | Self::Repository(_) => {
                "EXPORT_UNAVAILABLE"
            }
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Register(e) => e.into(),
            other => Self::Unavailable(format!("Export could not be produced: {other}")),
        }
    }
}
