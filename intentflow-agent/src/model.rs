//! Language-model collaborator and its genai-backed implementation.

use async_trait::async_trait;
use genai::{
    Client,
    chat::{ChatMessage, ChatOptions, ChatRequest},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, Result};

/// Who said a line of conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One prior turn passed to the model as history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Text generation collaborator
///
/// Implementations return the reply text, or an error when the call fails
/// or the reply is empty.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier for logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, history: &[ChatTurn]) -> Result<String>;
}

/// Model provider types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAI,
    Anthropic,
    Google,
    Ollama,
}

impl ModelProvider {
    /// Environment variable genai reads the provider key from
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Google => Some("GEMINI_API_KEY"),
            Self::Ollama => None,
        }
    }
}

/// Sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: Some(1024),
        }
    }
}

impl ModelParameters {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Model configuration for genai integration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub model_name: String,
    pub parameters: ModelParameters,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Google,
            model_name: "gemini-2.0-flash".to_string(),
            parameters: ModelParameters::default(),
        }
    }
}

impl ModelConfig {
    pub fn new(provider: ModelProvider, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            parameters: ModelParameters::default(),
        }
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// True when the provider key is present in the environment
    pub fn has_credentials(&self) -> bool {
        self.provider
            .api_key_env()
            .is_none_or(|var| std::env::var(var).is_ok_and(|key| !key.is_empty()))
    }
}

/// [`LanguageModel`] backed by a `genai::Client`
pub struct GenAiModel {
    client: Client,
    config: ModelConfig,
}

impl GenAiModel {
    pub fn new(config: ModelConfig) -> Self {
        Self::with_client(Client::default(), config)
    }

    pub fn with_client(client: Client, config: ModelConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn options(&self) -> ChatOptions {
        let options = ChatOptions::default().with_temperature(self.config.parameters.temperature);
        match self.config.parameters.max_tokens {
            Some(max_tokens) => options.with_max_tokens(max_tokens),
            None => options,
        }
    }
}

#[async_trait]
impl LanguageModel for GenAiModel {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn generate(&self, prompt: &str, history: &[ChatTurn]) -> Result<String> {
        let mut messages: Vec<ChatMessage> = history
            .iter()
            .map(|turn| match turn.role {
                ChatRole::System => ChatMessage::system(turn.content.clone()),
                ChatRole::User => ChatMessage::user(turn.content.clone()),
                ChatRole::Assistant => ChatMessage::assistant(turn.content.clone()),
            })
            .collect();
        messages.push(ChatMessage::user(prompt));

        debug!(model = %self.config.model_name, turns = messages.len(), "calling language model");
        let response = self
            .client
            .exec_chat(
                &self.config.model_name,
                ChatRequest::new(messages),
                Some(&self.options()),
            )
            .await?;

        response
            .content_text_as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(AgentError::EmptyResponse)
    }
}
