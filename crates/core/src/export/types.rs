//! Export cache types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use till_shared::types::{CashRegisterId, ExportId};

/// Rendered statement format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportFormat {
    /// PDF document.
    Pdf,
    /// OOXML spreadsheet.
    Excel,
}

impl ExportFormat {
    /// Both formats.
    pub const ALL: [Self; 2] = [Self::Pdf, Self::Excel];

    /// MIME type of the rendered bytes.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// File extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
        }
    }

    /// Lowercase name used in routes and storage keys.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "excel",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(format!("Unknown export format: {s}")),
        }
    }
}

/// Cache entry for a rendered statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRegisterExport {
    /// Entry ID.
    pub id: ExportId,
    /// Register the statement belongs to.
    pub cash_register_id: CashRegisterId,
    /// Format.
    pub format: ExportFormat,
    /// Opaque storage key of the blob.
    pub url: String,
    /// MIME type.
    pub content_type: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// End of validity.
    pub expires_at: DateTime<Utc>,
}

impl CashRegisterExport {
    /// Whether the entry is still servable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Metadata row to insert after the blob is written.
#[derive(Debug, Clone)]
pub struct NewExport {
    /// Register.
    pub cash_register_id: CashRegisterId,
    /// Format.
    pub format: ExportFormat,
    /// Storage key.
    pub url: String,
    /// MIME type.
    pub content_type: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// End of validity.
    pub expires_at: DateTime<Utc>,
}

/// A cache entry together with its bytes.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    /// Metadata.
    pub export: CashRegisterExport,
    /// Rendered document.
    pub bytes: Vec<u8>,
}

impl CachedArtifact {
    /// MIME type of `bytes`.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.export.content_type
    }

    /// Download name: `cash-register-{id}.{pdf|xlsx}`.
    #[must_use]
    pub fn filename(&self) -> String {
        format!(
            "cash-register-{}.{}",
            self.export.cash_register_id,
            self.export.format.extension()
        )
    }
}
