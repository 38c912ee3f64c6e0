use std::sync::Arc;

use async_trait::async_trait;
use intentflow_tools::{ApiHandler, ApiParameters};
use serde_json::{Value, json};

use crate::model::{ChatTurn, LanguageModel};

/// `Gemini/Chat`: a free-form chat turn against the language model
pub struct ChatHandler {
    model: Arc<dyn LanguageModel>,
}

impl ChatHandler {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ApiHandler for ChatHandler {
    fn software(&self) -> &str {
        "Gemini"
    }

    fn api(&self) -> &str {
        "Chat"
    }

    fn description(&self) -> &str {
        "Conversational reply from the language model"
    }

    async fn call(&self, parameters: ApiParameters) -> intentflow_tools::Result<Value> {
        let message: String = parameters.get_or("message", String::new())?;
        let history: Vec<ChatTurn> = parameters.get_or("history", Vec::new())?;
        let reply = self.model.generate(&message, &history).await?;
        Ok(json!({ "response": reply }))
    }
}
