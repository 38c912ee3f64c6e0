use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

/// An integration that executes one (software, api) pair
#[async_trait]
pub trait ApiHandler: Send + Sync {
    /// Software name as it appears in the API registry
    fn software(&self) -> &str;

    /// API name as it appears in the API registry
    fn api(&self) -> &str;

    /// Short description used in logs and listings
    fn description(&self) -> &str {
        ""
    }

    /// Execute the call with resolved parameters
    async fn call(&self, parameters: ApiParameters) -> Result<Value>;

    /// Table key for this handler
    fn key(&self) -> ApiKey {
        ApiKey::new(self.software(), self.api())
    }
}

/// (software, api) pair identifying a registered integration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApiKey {
    pub software: String,
    pub api: String,
}

impl ApiKey {
    pub fn new(software: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            software: software.into(),
            api: api.into(),
        }
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.software, self.api)
    }
}

/// Resolved call parameters with typed accessors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiParameters {
    inner: Map<String, Value>,
}

impl ApiParameters {
    pub fn new(inner: Map<String, Value>) -> Self {
        Self { inner }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &Map<String, Value> {
        &self.inner
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.inner
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .inner
            .get(key)
            .ok_or_else(|| ToolError::invalid_field(key, "is required"))?;
        serde_json::from_value(value.clone())
            .map_err(|_| ToolError::invalid_field(key, "has the wrong type"))
    }

    /// Absent and null both read as `None`.
    pub fn get_optional<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.inner.get(key) {
            Some(value) if !value.is_null() => Ok(Some(
                serde_json::from_value(value.clone())
                    .map_err(|_| ToolError::invalid_field(key, "has the wrong type"))?,
            )),
            _ => Ok(None),
        }
    }

    pub fn get_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        Ok(self.get_optional(key)?.unwrap_or(default))
    }

    pub fn get_string_optional(&self, key: &str) -> Result<Option<String>> {
        self.get_optional(key)
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys().cloned().collect()
    }
}

impl From<Map<String, Value>> for ApiParameters {
    fn from(inner: Map<String, Value>) -> Self {
        Self::new(inner)
    }
}

impl From<ApiParameters> for Value {
    fn from(params: ApiParameters) -> Self {
        Value::Object(params.inner)
    }
}

impl fmt::Display for ApiParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.inner.clone()))
    }
}
