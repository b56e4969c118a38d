use ai_client::{AiError, Agent, Message, OpenAi, PromptBuilder};
use anyhow::Result;
use async_trait::async_trait;

/// One chat-completion call: ordered messages plus sampling controls.
///
/// The model identifier is bound into the [`CompletionService`] itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            max_tokens: 256,
            temperature: 0.0,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Dyn-compatible text completion (wraps an `ai_client` agent).
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// [`CompletionService`] backed by the OpenAI chat-completions API.
pub struct OpenAiCompletion {
    ai: OpenAi,
}

impl OpenAiCompletion {
    pub fn new(ai: OpenAi) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.ai
            .prompt("")
            .messages(request.messages)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .send()
            .await
    }
}

/// Coarse category of a provider failure, as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    Authentication(String),
    Other(String),
}

impl ProviderFailure {
    pub fn categorize(err: &anyhow::Error) -> Self {
        let detail = format!("{err:#}");
        match err.downcast_ref::<AiError>() {
            Some(ai_err) if ai_err.is_auth() => ProviderFailure::Authentication(detail),
            _ => ProviderFailure::Other(detail),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ProviderFailure::Authentication(_))
    }

    pub fn detail(&self) -> &str {
        match self {
            ProviderFailure::Authentication(detail) | ProviderFailure::Other(detail) => detail,
        }
    }
}
