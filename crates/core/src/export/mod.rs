//! Export cache and document delivery.
//!
//! Rendered statements are cached per `(register, format)` for a limited
//! time. Blobs live in object storage; metadata rows point at them.

mod cache;
mod error;
mod service;
mod types;

pub use cache::{BlobStore, DEFAULT_TTL_HOURS, ExportCache, ExportRepository};
pub use error::ExportError;
pub use service::{DEFAULT_RENDER_TIMEOUT, ExportService};
pub use types::{CachedArtifact, CashRegisterExport, ExportFormat, NewExport};
