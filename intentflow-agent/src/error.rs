//! Failures talking to the language model.

use intentflow_core::error::FlowError;
use intentflow_tools::ToolError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

/// Error raised by intent extraction, clarification and chat.
///
/// Callers that must never fail (clarification text, intent extraction)
/// catch these and fall back; only [`crate::chat::ChatHandler`] lets them
/// escape, converted to a [`ToolError`].
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// No model, missing API key, or an unusable model setting.
    #[error("Language model not configured: {0}")]
    Configuration(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Empty model response")]
    EmptyResponse,

    /// Reply text that is not the JSON shape asked for.
    #[error("Could not parse model response: {0}")]
    Parse(String),

    #[error("Rejected model input: {0}")]
    Validation(String),

    #[error("Model call timed out: {0}")]
    Timeout(String),

    #[error("API call failed: {0}")]
    Tool(String),

    #[error("Malformed JSON: {0}")]
    Serialization(String),

    #[error("Agent fault: {0}")]
    Internal(String),
}

impl AgentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Asking the model again could give a usable answer
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Model(_) | Self::EmptyResponse | Self::Parse(_) | Self::Timeout(_)
        )
    }

    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Validation(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Model(_) | Self::EmptyResponse => "model",
            Self::Parse(_) | Self::Serialization(_) => "parse",
            Self::Validation(_) => "validation",
            Self::Timeout(_) => "timeout",
            Self::Tool(_) => "tool",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<genai::Error> for AgentError {
    fn from(err: genai::Error) -> Self {
        Self::Model(err.to_string())
    }
}

impl From<AgentError> for FlowError {
    fn from(err: AgentError) -> Self {
        FlowError::construction(err.to_string())
    }
}

impl From<FlowError> for AgentError {
    fn from(err: FlowError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        Self::Tool(err.to_string())
    }
}

// Chat replies surface through the dispatcher as step errors.
impl From<AgentError> for ToolError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Configuration(message) => ToolError::configuration(message),
            AgentError::Timeout(message) => ToolError::timeout(message),
            AgentError::Validation(message) => ToolError::invalid_parameters(message),
            other => ToolError::execution(other.to_string()),
        }
    }
}
