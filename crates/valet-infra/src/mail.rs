//! AppleScript mail composer.
//!
//! Drives Mail.app through `osascript` to create a visible draft for the
//! user to review. Nothing is sent automatically.

use std::future::Future;
use std::pin::Pin;

use tokio::process::Command;

use valet_core::mail::{EmailDraft, MailError, Mailer};

/// Composes drafts in Mail.app via `osascript`. macOS only; on other
/// platforms `compose` reports [`MailError::Unavailable`].
pub struct AppleScriptMailer;

impl AppleScriptMailer {
    fn script(draft: &EmailDraft) -> String {
        let mut script = format!(
            "tell application \"Mail\"\n\
             set newMessage to make new outgoing message with properties \
             {{subject:\"{}\", content:\"{}\", visible:true}}\n\
             tell newMessage\n\
             make new to recipient at end of to recipients with properties \
             {{address:\"{}\"}}\n",
            escape(&draft.subject),
            escape(&draft.body),
            escape(&draft.to),
        );
        for attachment in &draft.attachments {
            script.push_str(&format!(
                "make new attachment with properties \
                 {{file name:(POSIX file \"{}\")}} at after the last paragraph\n",
                escape(&attachment.display().to_string()),
            ));
        }
        script.push_str("end tell\nactivate\nend tell");
        script
    }
}

impl Mailer for AppleScriptMailer {
    fn compose<'a>(
        &'a self,
        draft: &'a EmailDraft,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>> {
        Box::pin(async move {
            if !cfg!(target_os = "macos") {
                return Err(MailError::Unavailable);
            }

            tracing::info!(to = %draft.to, subject = %draft.subject, "composing mail draft");
            let output = Command::new("osascript")
                .arg("-e")
                .arg(Self::script(draft))
                .output()
                .await
                .map_err(|e| MailError::Compose(e.to_string()))?;

            if output.status.success() {
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(MailError::Compose(stderr.trim().to_string()))
            }
        })
    }
}

/// Escape a string for inclusion in a double-quoted AppleScript literal.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
