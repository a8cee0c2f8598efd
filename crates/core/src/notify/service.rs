//! Distribution notifier.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use till_shared::EmailAttachment;
use till_shared::types::CashRegisterId;

use super::mailer::StatementMailer;
use crate::access::{AuthenticatedUser, Shop, ShopDirectory};
use crate::export::{BlobStore, ExportFormat, ExportRepository, ExportService};
use crate::ledger::MovementRepository;
use crate::register::{CashRegister, RegisterRepository, RegisterService, RegisterStatus};
use crate::statement::StatementFormatter;

/// `arqueo-{DD-MM-YYYY}.{pdf|xlsx}`.
#[must_use]
pub fn attachment_name(
    formatter: &StatementFormatter,
    closed_at: DateTime<Utc>,
    format: ExportFormat,
) -> String {
    format!("arqueo-{}.{}", formatter.date(closed_at), format.extension())
}

/// Subject and plain-text body for a closed register.
#[must_use]
pub fn compose_message(
    formatter: &StatementFormatter,
    register: &CashRegister,
    shop: &Shop,
) -> (String, String) {
    let closed_at = register.closed_at.unwrap_or(register.opened_at);
    let subject = format!(
        "Cash register closing - {} - {}",
        shop.name,
        formatter.date(closed_at)
    );

    let currency = shop.currency.as_str();
    let body = [
        format!("Shop: {}", shop.name),
        format!("Opened: {}", formatter.date_time(register.opened_at)),
        format!("Closed: {}", formatter.date_time(closed_at)),
        format!(
            "Opening amount: {}",
            formatter.money(register.opening_amount, currency)
        ),
        format!(
            "Expected amount: {}",
            formatter.optional_money(register.closing_amount, currency)
        ),
        format!(
            "Counted amount: {}",
            formatter.optional_money(register.actual_amount, currency)
        ),
        format!(
            "Difference: {} ({})",
            formatter.optional_money(register.difference, currency),
            register.difference_status().map_or("-", |s| s.label())
        ),
        String::new(),
        "The statement is attached as PDF and spreadsheet.".to_string(),
    ]
    .join("\n");

    (subject, body)
}

/// Emails both statement formats after a close.
///
/// Every failure is logged and swallowed; the close has already committed.
pub struct DistributionNotifier<R, M, D, E, B, S>
where
    R: RegisterRepository,
    M: MovementRepository,
    D: ShopDirectory,
    E: ExportRepository,
    B: BlobStore,
    S: StatementMailer,
{
    registers: Arc<RegisterService<R, M, D>>,
    exports: Arc<ExportService<R, M, D, E, B>>,
    mailer: Arc<S>,
    recipient: Option<String>,
    formatter: StatementFormatter,
}

impl<R, M, D, E, B, S> DistributionNotifier<R, M, D, E, B, S>
where
    R: RegisterRepository,
    M: MovementRepository,
    D: ShopDirectory,
    E: ExportRepository,
    B: BlobStore,
    S: StatementMailer,
{
    /// Create a new notifier. `recipient = None` disables sending.
    #[must_use]
    pub fn new(
        registers: Arc<RegisterService<R, M, D>>,
        exports: Arc<ExportService<R, M, D, E, B>>,
        mailer: Arc<S>,
        recipient: Option<String>,
        formatter: StatementFormatter,
    ) -> Self {
        Self {
            registers,
            exports,
            mailer,
            recipient: recipient.filter(|r| !r.trim().is_empty()),
            formatter,
        }
    }

    /// Sends the statement of a freshly closed register.
    pub async fn on_close(&self, id: CashRegisterId, user: &AuthenticatedUser) {
        let (register, shop) = match self.registers.find_with_shop(id).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                tracing::debug!(register_id = %id, "distribution skipped: register not found");
                return;
            }
            Err(e) => {
                tracing::error!(register_id = %id, error = %e, "distribution failed to load register");
                return;
            }
        };

        if register.status != RegisterStatus::Closed {
            tracing::debug!(register_id = %id, "distribution skipped: register not closed");
            return;
        }

        let Some(recipient) = self.recipient.as_deref() else {
            tracing::info!(register_id = %id, "distribution skipped: no recipient configured");
            return;
        };

        let closed_at = register.closed_at.unwrap_or(register.opened_at);
        let mut attachments = Vec::with_capacity(ExportFormat::ALL.len());
        for format in ExportFormat::ALL {
            match self.exports.get_or_render(id, format, user).await {
                Ok(artifact) => attachments.push(EmailAttachment {
                    filename: attachment_name(&self.formatter, closed_at, format),
                    content_type: artifact.export.content_type,
                    content: artifact.bytes,
                }),
                Err(e) => {
                    tracing::error!(register_id = %id, %format, error = %e, "distribution failed to export statement");
                    return;
                }
            }
        }

        let (subject, body) = compose_message(&self.formatter, &register, &shop);
        match self
            .mailer
            .send_statement(recipient, &subject, &body, attachments)
            .await
        {
            Ok(()) => tracing::info!(register_id = %id, recipient, "closing statement sent"),
            Err(e) => {
                tracing::error!(register_id = %id, recipient, error = %e, "failed to send closing statement");
            }
        }
    }
}
