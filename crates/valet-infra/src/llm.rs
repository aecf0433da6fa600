//! OpenAI completion provider.
//!
//! Uses [`async_openai`] for type-safe request/response handling against
//! the chat-completions endpoint.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::{ExposeSecret, SecretString};

use valet_core::llm::CompletionProvider;
use valet_types::llm::{CompletionError, CompletionRequest};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Chat-completion provider backed by the OpenAI API.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &SecretString, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        OpenAiProvider {
            client: Client::with_config(config),
            model: model.into(),
        }
    }

    /// Build a provider from `OPENAI_API_KEY`, or `None` when it is unset
    /// or empty. Callers degrade gracefully instead of failing startup.
    pub fn from_env(model: impl Into<String>) -> Option<Self> {
        match std::env::var(OPENAI_API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => {
                Some(OpenAiProvider::new(&SecretString::from(key), model))
            }
            _ => {
                tracing::warn!(
                    "{OPENAI_API_KEY_VAR} is not set, language-model actions are disabled"
                );
                None
            }
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(request.prompt.clone()),
                name: None,
            },
        ));

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
            ..Default::default()
        }
    }
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(|e| CompletionError::Request(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| CompletionError::Malformed("no content in first choice".to_string()))
    }
}
