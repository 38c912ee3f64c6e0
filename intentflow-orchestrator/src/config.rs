//! Orchestrator configuration.
//!
//! Values come from defaults, then an optional YAML file, then
//! `INTENTFLOW_*` environment variables.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use intentflow_agent::ModelConfig;
use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, Result};

pub const ENV_SESSION_TTL_SECS: &str = "INTENTFLOW_SESSION_TTL_SECS";
pub const ENV_MAX_SESSIONS: &str = "INTENTFLOW_MAX_SESSIONS";
pub const ENV_MOCK_FALLBACK: &str = "INTENTFLOW_MOCK_FALLBACK";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "INTENTFLOW_HTTP_TIMEOUT_SECS";
pub const ENV_REGISTRY_PATH: &str = "INTENTFLOW_REGISTRY_PATH";
pub const ENV_MODEL: &str = "INTENTFLOW_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Idle time after which a session is dropped
    pub session_ttl_secs: u64,
    /// Live sessions kept before the least recently used is evicted
    pub max_sessions: usize,
    /// Answer unmapped APIs with demo responses instead of failing
    pub mock_fallback: bool,
    /// Timeout for raw HTTP and integration calls
    pub http_timeout_secs: u64,
    /// API registry file (JSON, or YAML by extension)
    pub registry_path: Option<PathBuf>,
    pub model: ModelConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            max_sessions: 1024,
            mock_fallback: true,
            http_timeout_secs: 30,
            registry_path: None,
            model: ModelConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_yaml::from_str(&raw)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`; blank values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_SESSION_TTL_SECS) {
            self.session_ttl_secs = parse(ENV_SESSION_TTL_SECS, &value)?;
        }
        if let Some(value) = read(ENV_MAX_SESSIONS) {
            self.max_sessions = parse(ENV_MAX_SESSIONS, &value)?;
        }
        if let Some(value) = read(ENV_MOCK_FALLBACK) {
            self.mock_fallback = parse(ENV_MOCK_FALLBACK, &value)?;
        }
        if let Some(value) = read(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs = parse(ENV_HTTP_TIMEOUT_SECS, &value)?;
        }
        if let Some(value) = read(ENV_REGISTRY_PATH) {
            self.registry_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read(ENV_MODEL) {
            self.model.model_name = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_ttl_secs == 0 {
            return Err(OrchestratorError::configuration(
                "session_ttl_secs must be greater than zero",
            ));
        }
        if self.max_sessions == 0 {
            return Err(OrchestratorError::configuration(
                "max_sessions must be greater than zero",
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(OrchestratorError::configuration(
                "http_timeout_secs must be greater than zero",
            ));
        }
        if self.model.model_name.trim().is_empty() {
            return Err(OrchestratorError::configuration("model name must not be empty"));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| OrchestratorError::invalid_env(key, value))
}
