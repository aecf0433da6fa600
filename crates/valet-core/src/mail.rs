//! Email-compose collaborator trait.
//!
//! The engine never sends mail itself; the `send_letter_via_email_macos`
//! action builds an [`EmailDraft`] and hands it to a [`Mailer`]. The infra
//! implementation drives Mail.app through AppleScript; tests use a fake.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;

/// A draft message handed to the mail collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

impl EmailDraft {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        EmailDraft {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }
}

/// Errors from the mail collaborator.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail composition failed: {0}")]
    Compose(String),

    #[error("mail client is unavailable on this platform")]
    Unavailable,
}

/// Email-compose collaborator. Object-safe (boxed future) because handlers
/// hold it behind `Arc<dyn Mailer>`.
pub trait Mailer: Send + Sync {
    /// Create a draft in the user's mail client for review.
    fn compose<'a>(
        &'a self,
        draft: &'a EmailDraft,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>>;
}
