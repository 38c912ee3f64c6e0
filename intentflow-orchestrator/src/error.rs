//! Error types for orchestrator setup.
//!
//! Step execution never returns these: failures during `execute_step` are
//! reported as [`StepOutcome`](crate::outcome::StepOutcome) values.

use intentflow_agent::AgentError;
use intentflow_core::error::FlowError;
use thiserror::Error;

/// Result type for orchestrator setup.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidEnvOverride {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) | Self::InvalidEnvOverride { .. } | Self::Yaml(_) => {
                "configuration"
            }
            Self::Flow(_) => "flow",
            Self::Agent(err) => err.category(),
            Self::Io(_) => "io",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Agent(err) => err.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_error_names_key_and_value() {
        let err = OrchestratorError::invalid_env("INTENTFLOW_MAX_SESSIONS", "many");
        assert_eq!(
            err.to_string(),
            "Invalid environment override for `INTENTFLOW_MAX_SESSIONS`: `many`"
        );
        assert_eq!(err.category(), "configuration");
        assert!(!err.is_retryable());
    }

    #[test]
    fn flow_errors_pass_through() {
        let err = OrchestratorError::from(FlowError::session_not_found("s1"));
        assert_eq!(err.to_string(), "Session not found: s1");
        assert_eq!(err.category(), "flow");
    }
}
