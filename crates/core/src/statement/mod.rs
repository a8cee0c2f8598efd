//! Statement rendering for closed registers.
//!
//! Turns a closed register into a PDF or spreadsheet. Renderers are pure
//! functions of a [`StatementContext`]; the only state they keep is the
//! lazily loaded logo.

mod context;
mod excel;
mod format;
mod logo;
mod pdf;
mod renderer;

pub use context::{StatementContext, StatementLine};
pub use excel::ExcelRenderer;
pub use format::{DEFAULT_TIMEZONE, StatementFormatter};
pub use logo::LogoCache;
pub use pdf::PdfRenderer;
pub use renderer::{RenderError, StatementRenderer, StatementRenderers};
