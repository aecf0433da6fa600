//! LLM collaborator types.
//!
//! The assistant consumes two external model surfaces: a chat-completion
//! call (prompt in, text out) used for general chat, letter editing, intent
//! planning, and tool-manifest generation; and a computation query call
//! (query string in, result text out).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A prompt-in/text-out completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Optional system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The user prompt.
    pub prompt: String,
    /// Sampling temperature. `None` means the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// A user-only request with deterministic sampling.
    pub fn user(prompt: impl Into<String>) -> Self {
        CompletionRequest {
            system: None,
            prompt: prompt.into(),
            temperature: Some(0.0),
        }
    }

    /// Attach a system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Errors from the chat-completion collaborator.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider is not configured (missing API key)")]
    Unconfigured,

    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion response was empty or malformed: {0}")]
    Malformed(String),
}

/// Errors from the computation query collaborator.
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("calculation provider is not configured (missing app id)")]
    Unconfigured,

    #[error("calculation request failed: {0}")]
    Request(String),

    #[error("no result for query '{0}'")]
    NoResult(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::user("hello").with_system("be terse");
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.system.as_deref(), Some("be terse"));
        assert_eq!(req.temperature, Some(0.0));
    }

    #[test]
    fn test_completion_request_serde_omits_absent_system() {
        let req = CompletionRequest {
            system: None,
            prompt: "hi".to_string(),
            temperature: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("temperature").is_none());
    }
}
