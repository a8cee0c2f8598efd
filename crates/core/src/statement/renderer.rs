//! Renderer capability.

use std::sync::Arc;

use thiserror::Error;

use super::context::StatementContext;
use crate::export::ExportFormat;

/// Errors raised while producing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// PDF backend failure.
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    /// Spreadsheet backend failure.
    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(String),

    /// Configured timezone is not a valid IANA name.
    #[error("Unknown timezone: {0}")]
    Timezone(String),

    /// The rendering task panicked or was cancelled.
    #[error("Renderer task failed: {0}")]
    Aborted(String),
}

/// Renders a statement into one document format.
///
/// Implementations must not touch persistent state.
pub trait StatementRenderer: Send + Sync {
    /// Format produced by this renderer.
    fn format(&self) -> ExportFormat;

    /// Render the statement.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` when the backend fails.
    fn render(&self, ctx: &StatementContext) -> Result<Vec<u8>, RenderError>;
}

/// One renderer per format.
#[derive(Clone)]
pub struct StatementRenderers {
    pdf: Arc<dyn StatementRenderer>,
    excel: Arc<dyn StatementRenderer>,
}

impl StatementRenderers {
    /// Pair up renderers.
    #[must_use]
    pub fn new(pdf: Arc<dyn StatementRenderer>, excel: Arc<dyn StatementRenderer>) -> Self {
        Self { pdf, excel }
    }

    /// Renderer for `format`.
    #[must_use]
    pub fn for_format(&self, format: ExportFormat) -> Arc<dyn StatementRenderer> {
        match format {
            ExportFormat::Pdf => Arc::clone(&self.pdf),
            ExportFormat::Excel => Arc::clone(&self.excel),
        }
    }
}

impl std::fmt::Debug for StatementRenderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementRenderers")
            .field("pdf", &self.pdf.format())
            .field("excel", &self.excel.format())
            .finish()
    }
}
