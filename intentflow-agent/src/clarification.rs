//! Clarification questions and error suggestions.
//!
//! Both operations have two paths: ask the language model, or fall back to a
//! fixed template. Any model failure, an empty reply, or having no model at
//! all takes the template path, so callers always get text back.

use std::sync::Arc;

use intentflow_core::{registry::ParameterSpec, workflow::ApiRef};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    error::{AgentError, Result},
    model::LanguageModel,
};

/// Where generated text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Model,
    Fallback,
}

/// Prompt text shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
    pub source: TextSource,
}

impl GeneratedText {
    fn model(text: String) -> Self {
        Self {
            text,
            source: TextSource::Model,
        }
    }

    fn fallback(text: String) -> Self {
        Self {
            text,
            source: TextSource::Fallback,
        }
    }
}

/// Turns missing parameters and failures into user-facing text
#[derive(Clone, Default)]
pub struct ClarificationGenerator {
    model: Option<Arc<dyn LanguageModel>>,
}

impl ClarificationGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Generator that always uses the templates
    pub fn templates_only() -> Self {
        Self::default()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Questions asking the user for `missing`
    pub async fn clarification_questions(
        &self,
        api: &ApiRef,
        missing: &[ParameterSpec],
    ) -> GeneratedText {
        let prompt = clarification_prompt(api, missing);
        match self.ask(&prompt).await {
            Ok(text) => GeneratedText::model(text),
            Err(err) => {
                warn!(api = %api.name, error = %err, "using fallback clarification questions");
                GeneratedText::fallback(fallback_questions(missing))
            }
        }
    }

    /// What the user could do about a failed call
    pub async fn error_suggestion(&self, api: &ApiRef, error: &str) -> GeneratedText {
        let prompt = suggestion_prompt(api, error);
        match self.ask(&prompt).await {
            Ok(text) => GeneratedText::model(text),
            Err(err) => {
                warn!(api = %api.name, error = %err, "using fallback error suggestion");
                GeneratedText::fallback(fallback_suggestion(error))
            }
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AgentError::configuration("no language model configured"))?;
        debug!(model = model.name(), "requesting generated text");
        let text = model.generate(prompt, &[]).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

impl std::fmt::Debug for ClarificationGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClarificationGenerator")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .finish()
    }
}

pub fn clarification_prompt(api: &ApiRef, missing: &[ParameterSpec]) -> String {
    let params: Vec<_> = missing
        .iter()
        .map(|spec| {
            let description = if spec.description.is_empty() {
                &spec.name
            } else {
                &spec.description
            };
            json!({
                "name": spec.name,
                "description": description,
                "type": spec.param_type,
            })
        })
        .collect();
    let listing = serde_json::to_string_pretty(&params).unwrap_or_default();

    format!(
        "I need to execute the API \"{}\" ({}), but I'm missing some information.\n\n\
         I need the user to provide values for the following parameters:\n{listing}\n\n\
         Generate 1-3 natural, conversational questions to ask the user for this information.\n\
         Be concise but friendly. Don't include any preamble or conclusion, just the questions.",
        api.name, api.description
    )
}

pub fn suggestion_prompt(api: &ApiRef, error: &str) -> String {
    format!(
        "I encountered an error while trying to execute the API \"{}\" ({}):\n\n\
         Error: {error}\n\n\
         Based on this error, suggest what the user should do next to fix the issue.\n\
         Keep your response concise and helpful (1-3 sentences maximum).",
        api.name, api.description
    )
}

/// One line per parameter
pub fn fallback_questions(missing: &[ParameterSpec]) -> String {
    missing
        .iter()
        .map(|spec| format!("Please provide the {} ({})", spec.name, spec.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn fallback_suggestion(error: &str) -> String {
    format!("There was an error: {error}. Please check your parameters and try again.")
}
