//! API registry: the catalogue of software and APIs a workflow may call.

use std::{fmt::Write as _, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

/// A single parameter accepted by an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type", default = "default_param_type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_param_type() -> String {
    "string".to_string()
}

impl ParameterSpec {
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// An API offered by a piece of software.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ApiEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Parameter specs marked required, in declaration order.
    pub fn required_parameters(&self) -> Vec<ParameterSpec> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .cloned()
            .collect()
    }
}

/// A piece of software and the APIs it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub apis: Vec<ApiEntry>,
}

impl SoftwareEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            apis: Vec::new(),
        }
    }

    pub fn with_api(mut self, api: ApiEntry) -> Self {
        self.apis.push(api);
        self
    }
}

/// Ordered, read-only collection of software entries.
///
/// Serialized as a bare JSON array, matching the `api_info` document
/// consumed by intent extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiRegistry {
    software: Vec<SoftwareEntry>,
}

impl ApiRegistry {
    pub fn new(software: Vec<SoftwareEntry>) -> Self {
        Self { software }
    }

    /// Parse a registry from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a registry from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a registry file. `.yaml`/`.yml` files are read as YAML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let registry = if is_yaml {
            Self::from_yaml_str(&raw)?
        } else {
            Self::from_json_str(&raw)?
        };

        if registry.is_empty() {
            return Err(FlowError::construction(format!(
                "API registry at {} contains no software",
                path.display()
            )));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            path = %path.display(),
            software = registry.len(),
            "loaded API registry"
        );

        Ok(registry)
    }

    /// Exact (software, api) lookup.
    pub fn find_api(&self, software: &str, api: &str) -> Option<&ApiEntry> {
        self.software
            .iter()
            .filter(|s| s.name == software)
            .flat_map(|s| s.apis.iter())
            .find(|a| a.name == api)
    }

    pub fn software(&self) -> &[SoftwareEntry] {
        &self.software
    }

    pub fn len(&self) -> usize {
        self.software.len()
    }

    pub fn is_empty(&self) -> bool {
        self.software.is_empty()
    }

    /// Compact text listing of every API, used as the model's API reference.
    pub fn reference_string(&self) -> String {
        let mut out = String::new();
        for software in &self.software {
            let _ = writeln!(out, "SOFTWARE: {} - {}", software.name, software.description);
            for api in &software.apis {
                let _ = writeln!(out, "  API: {} - {}", api.name, api.description);
                out.push_str("  Parameters:\n");
                for param in &api.parameters {
                    let required = if param.required { ", required" } else { "" };
                    let _ = writeln!(
                        out,
                        "    - {} ({}{}): {}",
                        param.name, param.param_type, required, param.description
                    );
                }
                out.push('\n');
            }
        }
        out
    }
}
