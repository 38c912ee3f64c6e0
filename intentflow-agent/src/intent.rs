//! Intent extraction: free text in, workflow out.

use std::sync::Arc;

use intentflow_core::{registry::ApiRegistry, workflow::WorkflowStep};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    error::{AgentError, Result},
    model::LanguageModel,
};

/// What the model made of a user request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentExtraction {
    pub has_agent_intention: bool,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub workflow: Vec<WorkflowStep>,
}

impl IntentExtraction {
    /// The no-intention answer reported when extraction fails
    pub fn failed(err: &AgentError) -> Self {
        Self {
            has_agent_intention: false,
            reasoning: format!("Error calling LLM service: {err}"),
            workflow: Vec::new(),
        }
    }
}

/// Asks a language model which registry APIs a request needs
#[derive(Clone)]
pub struct IntentExtractor {
    model: Arc<dyn LanguageModel>,
    registry: Arc<ApiRegistry>,
}

impl IntentExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, registry: Arc<ApiRegistry>) -> Self {
        Self { model, registry }
    }

    /// Extract intent; failures come back as a no-intention answer
    pub async fn extract(&self, user_prompt: &str) -> IntentExtraction {
        match self.try_extract(user_prompt).await {
            Ok(extraction) => {
                info!(
                    has_intention = extraction.has_agent_intention,
                    steps = extraction.workflow.len(),
                    "extracted intent"
                );
                extraction
            }
            Err(err) => {
                error!(error = %err, "intent extraction failed");
                IntentExtraction::failed(&err)
            }
        }
    }

    pub async fn try_extract(&self, user_prompt: &str) -> Result<IntentExtraction> {
        let prompt = self.prompt(user_prompt);
        let reply = self.model.generate(&prompt, &[]).await?;
        parse_reply(&reply)
    }

    pub fn prompt(&self, user_prompt: &str) -> String {
        format!(
            r#"I'll analyze a user's request to determine if they want to use an API, which APIs they need, and what parameter values they've specified.

API REFERENCE:
{reference}

USER REQUEST: "{user_prompt}"

Based on the user request and available APIs, I'll:
1. Determine if the user wants to use an API
2. Identify which API(s) they need
3. Extract parameter values they've specified
4. Provide reasoning for my choices

Respond with JSON only, in this format:
{{
  "hasAgentIntention": true|false,
  "reasoning": "Brief explanation why this is or isn't an API request",
  "workflow": [
    {{
      "software": "software name",
      "api": {{
        "name": "API name",
        "description": "API description"
      }},
      "parameters": {{
        "param1": "value1",
        "param2": "value2"
      }},
      "reasoning": "Why I selected this API"
    }}
  ]
}}

If there's no API intention, "workflow" should be an empty array.
If the user wants to perform multiple operations in sequence, include all APIs in the "workflow" array in the correct order.
"#,
            reference = self.registry.reference_string()
        )
    }
}

/// Parse a model reply: whole text as JSON, else the outermost `{...}` block
pub fn parse_reply(text: &str) -> Result<IntentExtraction> {
    if let Ok(extraction) = serde_json::from_str(text.trim()) {
        return Ok(extraction);
    }
    let pattern = Regex::new(r"(?s)(\{.*\})").map_err(|err| AgentError::internal(err.to_string()))?;
    let block = pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| AgentError::parse("Could not extract valid JSON from the model response"))?;
    serde_json::from_str(block.as_str()).map_err(|err| AgentError::parse(err.to_string()))
}
