//! Cross-crate error taxonomy for Valet.
//!
//! Schema validation is the only hard failure boundary: a structurally
//! invalid workflow is rejected wholesale before any step runs. Every error
//! raised during execution is absorbed by the engine and rendered into a
//! per-step result string.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Schema validation
// ---------------------------------------------------------------------------

/// A single schema violation, addressed by field path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    /// Dotted field path, e.g. `steps.0.action`.
    pub path: String,
    /// Human-readable reason.
    pub reason: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// A malformed workflow payload, carrying every individual violation.
#[derive(Debug, Clone, Error)]
#[error("invalid workflow: {}", .violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl ValidationFailure {
    pub fn new(violations: Vec<Violation>) -> Self {
        ValidationFailure { violations }
    }

    /// Render each violation on its own line, for user-facing listings.
    pub fn lines(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// A handler raised an error for a reason other than missing arguments.
/// The message is preserved verbatim for the user-facing result.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError(message.into())
    }
}

/// Failure modes surfaced by registry invocation, distinguished by kind.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// No handler registered for the name.
    #[error("no handler registered for action '{0}'")]
    UnknownAction(String),

    /// The handler's required parameters were not all supplied.
    #[error("missing required arguments: {}", .missing.join(", "))]
    MissingArguments { missing: Vec<String> },

    /// The handler itself failed.
    #[error("{0}")]
    Handler(#[from] HandlerError),
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Errors from auto-tool synthesis. Never fatal: the engine reports them
/// as a "could not be loaded" step result.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("generation request failed: {0}")]
    Generation(String),

    #[error("generated manifest is malformed: {0}")]
    MalformedManifest(String),

    #[error("failed to persist tool manifest: {0}")]
    Persist(#[from] std::io::Error),

    #[error("synthesis is not configured")]
    Unconfigured,
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Errors from the conversation memory store.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("memory entry is malformed: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
