//! Post-close distribution of statements by email.

mod mailer;
mod service;

pub use mailer::StatementMailer;
pub use service::{DistributionNotifier, attachment_name, compose_message};
