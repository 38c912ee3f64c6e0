//! Abstract workflow steps produced by intent extraction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name and description of an API, as carried on workflow and plan steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRef {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ApiRef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// One requested API call: which software, which API, with what parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub software: String,
    pub api: ApiRef,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl WorkflowStep {
    pub fn new(software: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            software: software.into(),
            api: ApiRef::new(api, ""),
            parameters: Map::new(),
            reasoning: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.api.description = description.into();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_extractor_output() {
        let step: WorkflowStep = serde_json::from_value(json!({
            "software": "Calendar",
            "api": {"name": "AddEvent", "description": "Add an event"},
            "parameters": {"title": "Standup"},
            "reasoning": "User asked for a meeting"
        }))
        .unwrap();

        assert_eq!(step.api.name, "AddEvent");
        assert_eq!(step.parameters["title"], json!("Standup"));
        assert_eq!(step.reasoning.as_deref(), Some("User asked for a meeting"));
    }

    #[test]
    fn parameters_and_reasoning_are_optional() {
        let step: WorkflowStep = serde_json::from_value(json!({
            "software": "Calendar",
            "api": {"name": "AddEvent"}
        }))
        .unwrap();

        assert!(step.parameters.is_empty());
        assert!(step.reasoning.is_none());
        assert_eq!(step.api.description, "");
    }
}
