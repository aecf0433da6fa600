//! Workflow planning.
//!
//! Turns a free-text user request into a candidate workflow document via a
//! completion provider. The planner's output is untrusted model text; it is
//! only parsed here, never validated. Callers hand the parsed document to
//! [`crate::workflow::validate_value`] before execution.

use std::sync::Arc;

use serde_json::Value;
use valet_types::llm::{CompletionError, CompletionRequest};
use valet_types::workflow::KnownAction;

use crate::llm::CompletionProviderDyn;

/// Failure to obtain a parseable workflow document from the model.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("planner returned invalid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Plans workflows by prompting a completion provider for a JSON document.
pub struct Planner {
    provider: Arc<dyn CompletionProviderDyn>,
    actions: Vec<&'static str>,
}

impl Planner {
    pub fn new(provider: Arc<dyn CompletionProviderDyn>) -> Self {
        Planner {
            provider,
            actions: KnownAction::ALL.iter().map(|a| a.as_str()).collect(),
        }
    }

    /// Ask the model for a workflow serving `utterance`.
    ///
    /// Returns the raw parsed document. It may still be structurally
    /// invalid; schema validation is the caller's job.
    pub async fn plan(&self, utterance: &str) -> Result<Value, PlanError> {
        tracing::info!(provider = self.provider.name(), "planning workflow");

        let request = CompletionRequest::user(utterance.to_string())
            .with_system(self.system_prompt())
            .with_temperature(0.2);
        let raw = self.provider.complete_boxed(&request).await?;
        let body = strip_code_fences(&raw);

        let value: Value = serde_json::from_str(body)?;
        tracing::debug!(
            steps = value
                .get("steps")
                .and_then(serde_json::Value::as_array)
                .map(|s| s.len()),
            "planner produced candidate workflow"
        );
        Ok(value)
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are Valet, a personal assistant that plans workflows.\n\
             Respond with a single JSON object and nothing else.\n\
             The object has a \"steps\" array; each step is an object with an \
             \"action\" field naming one of: {}.\n\
             Steps may carry the fields subject, body, edit_instruction, \
             to_email, query, text, command, app_name, and a \"params\" object \
             for anything else. Include only the fields a step needs.\n\
             An optional top-level \"description\" string may summarize the \
             workflow.",
            self.actions.join(", ")
        )
    }
}

/// Strip a surrounding markdown code fence, if the model added one.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Discard an optional language tag on the fence line.
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
