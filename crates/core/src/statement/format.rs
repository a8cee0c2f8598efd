//! Date and money formatting shared by both renderers and the mailer.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use till_shared::types::Money;

use super::renderer::RenderError;

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Santiago";

/// Formats dates in a fixed timezone and money with the shop's currency code.
#[derive(Debug, Clone, Copy)]
pub struct StatementFormatter {
    tz: Tz,
}

impl StatementFormatter {
    /// Formatter for an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Timezone` for an unknown name.
    pub fn from_name(name: &str) -> Result<Self, RenderError> {
        let tz = name
            .trim()
            .parse::<Tz>()
            .map_err(|_| RenderError::Timezone(name.to_string()))?;
        Ok(Self { tz })
    }

    /// Formatter for a known timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The configured timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// `DD-MM-YYYY HH:MM` in the configured timezone.
    #[must_use]
    pub fn date_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format("%d-%m-%Y %H:%M").to_string()
    }

    /// `DD-MM-YYYY` in the configured timezone.
    #[must_use]
    pub fn date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format("%d-%m-%Y").to_string()
    }

    /// `{CODE} {amount}` with thousands separators.
    #[must_use]
    pub fn money(&self, amount: Decimal, currency: &str) -> String {
        Money::format_code(amount, currency)
    }

    /// Optional amount, `-` when missing.
    #[must_use]
    pub fn optional_money(&self, amount: Option<Decimal>, currency: &str) -> String {
        amount.map_or_else(|| "-".to_string(), |a| self.money(a, currency))
    }
}

impl Default for StatementFormatter {
    fn default() -> Self {
        Self::new(chrono_tz::America::Santiago)
    }
}
