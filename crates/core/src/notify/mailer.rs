//! Outbound mail capability.

use std::future::Future;

use till_shared::{EmailAttachment, EmailError, EmailService};

/// Sends one statement email.
pub trait StatementMailer: Send + Sync {
    /// Send a plain-text email with attachments.
    fn send_statement(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachments: Vec<EmailAttachment>,
    ) -> impl Future<Output = Result<(), EmailError>> + Send;
}

impl StatementMailer for EmailService {
    async fn send_statement(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachments: Vec<EmailAttachment>,
    ) -> Result<(), EmailError> {
        self.send_with_attachments(to, subject, body, attachments)
            .await
    }
}
