//! Per-session state threaded through handler calls.
//!
//! The letter document is session state, not process-wide state, so
//! concurrent sessions never collide. Handlers receive a shared
//! [`SessionContext`] and lock the document only for the duration of a read
//! or write.

use std::sync::Mutex;

/// The in-memory document the letter actions operate on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LetterDocument {
    pub content: String,
}

impl LetterDocument {
    /// Whether no letter has been drafted (or it was cleared).
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// State owned by one assistant session.
#[derive(Debug, Default)]
pub struct SessionContext {
    document: Mutex<LetterDocument>,
}

impl SessionContext {
    pub fn new() -> Self {
        SessionContext::default()
    }

    /// Replace the letter content wholesale.
    pub fn set_letter(&self, content: impl Into<String>) {
        let mut doc = self.document.lock().unwrap_or_else(|e| e.into_inner());
        doc.content = content.into();
    }

    /// A snapshot of the current letter content.
    pub fn letter(&self) -> String {
        let doc = self.document.lock().unwrap_or_else(|e| e.into_inner());
        doc.content.clone()
    }

    /// Clear the letter.
    pub fn clear_letter(&self) {
        let mut doc = self.document.lock().unwrap_or_else(|e| e.into_inner());
        doc.content.clear();
    }
}
