//! Collaborator traits for the chat-completion and computation services.
//!
//! `CompletionProvider` and `Calculator` use native async fn in traits
//! (RPITIT). Handlers and the planner hold type-erased collaborators, so
//! each trait also has an object-safe `*Dyn` twin with boxed futures and a
//! blanket implementation, the same pattern the registry's handlers use.

use std::future::Future;
use std::pin::Pin;

use valet_types::llm::{CalculationError, CompletionError, CompletionRequest};

// ---------------------------------------------------------------------------
// CompletionProvider
// ---------------------------------------------------------------------------

/// Chat-completion collaborator: prompt in, text out.
///
/// Implementations live in `valet-infra` (e.g. `OpenAiProvider`).
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response text.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

/// Object-safe version of [`CompletionProvider`] with boxed futures.
pub trait CompletionProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;
}

impl<T: CompletionProvider> CompletionProviderDyn for T {
    fn name(&self) -> &str {
        CompletionProvider::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Computation query collaborator: query string in, result text out.
pub trait Calculator: Send + Sync {
    /// Evaluate a natural-language computation query.
    fn query(
        &self,
        input: &str,
    ) -> impl Future<Output = Result<String, CalculationError>> + Send;
}

/// Object-safe version of [`Calculator`] with boxed futures.
pub trait CalculatorDyn: Send + Sync {
    fn query_boxed<'a>(
        &'a self,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CalculationError>> + Send + 'a>>;
}

impl<T: Calculator> CalculatorDyn for T {
    fn query_boxed<'a>(
        &'a self,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CalculationError>> + Send + 'a>> {
        Box::pin(self.query(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Echo;

    impl CompletionProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<String, CompletionError> {
            Ok(request.prompt.clone())
        }
    }

    #[tokio::test]
    async fn test_blanket_dyn_impl_delegates() {
        let provider: Arc<dyn CompletionProviderDyn> = Arc::new(Echo);
        let out = provider
            .complete_boxed(&CompletionRequest::user("ping"))
            .await
            .unwrap();
        assert_eq!(out, "ping");
        assert_eq!(provider.name(), "echo");
    }
}
