//! Auto-tool synthesizer trait.
//!
//! Invoked by the engine when a step names an action absent from the
//! registry and no keyword fallback applies. A successful synthesis has the
//! side effect of registering a new entry via
//! [`crate::registry::ActionRegistry::register`] -- the one place new
//! capability enters the system. The engine never verifies the generated
//! behavior; it only re-resolves the name afterward.

use std::future::Future;
use std::pin::Pin;

use valet_types::error::SynthesisError;

/// Runtime generation and registration of a new handler for a previously
/// unknown action. Object-safe (boxed future) because the engine holds it
/// behind `Arc<dyn ToolSynthesizer>`.
pub trait ToolSynthesizer: Send + Sync {
    /// Generate and register a handler for `action` taking `params`.
    ///
    /// Returns a success-marker string for the step result. Implementations
    /// must log full provenance: who requested, what was generated.
    fn synthesize<'a>(
        &'a self,
        action: &'a str,
        params: &'a [String],
        description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SynthesisError>> + Send + 'a>>;
}

/// A synthesizer that always declines. Used when no completion provider is
/// configured: unknown actions then report that the tool could not be
/// loaded instead of failing mid-request.
pub struct NullSynthesizer;

impl ToolSynthesizer for NullSynthesizer {
    fn synthesize<'a>(
        &'a self,
        action: &'a str,
        _params: &'a [String],
        _description: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, SynthesisError>> + Send + 'a>> {
        tracing::warn!(action, "tool synthesis requested but not configured");
        Box::pin(async { Err(SynthesisError::Unconfigured) })
    }
}
