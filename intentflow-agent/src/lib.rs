//! # IntentFlow Agent
//!
//! Language-model collaborators for IntentFlow: a genai-backed
//! [`LanguageModel`], the clarification and suggestion generator used while
//! executing steps, the intent extractor that produces workflows, and a chat
//! handler for the `Gemini/Chat` API.

pub mod chat;
pub mod clarification;
pub mod error;
pub mod intent;
pub mod model;

pub use chat::ChatHandler;
pub use clarification::{ClarificationGenerator, GeneratedText, TextSource};
pub use error::{AgentError, Result};
pub use intent::{IntentExtraction, IntentExtractor};
pub use model::{ChatRole, ChatTurn, GenAiModel, LanguageModel, ModelConfig, ModelParameters, ModelProvider};

/// Prelude module for convenient imports
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::{
        chat::ChatHandler,
        clarification::{ClarificationGenerator, GeneratedText, TextSource},
        error::{AgentError, Result},
        intent::{IntentExtraction, IntentExtractor},
        model::{ChatRole, ChatTurn, GenAiModel, LanguageModel, ModelConfig, ModelParameters, ModelProvider},
    };
}
