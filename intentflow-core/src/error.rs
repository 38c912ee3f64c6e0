//! Error types for IntentFlow.

use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Error types that can occur while planning or executing a workflow.
#[derive(Error, Debug)]
pub enum FlowError {
    /// No session is registered under the given id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The session exists but has no step with the given id.
    #[error("Step {step_id} not found")]
    StepNotFound {
        /// Session that was searched
        session_id: String,
        /// Step that was requested
        step_id: String,
    },

    /// A reference expression could not be parsed or walked.
    #[error("Could not resolve parameter reference '{reference}': {reason}")]
    Resolution {
        /// The original reference string, braces included
        reference: String,
        /// What went wrong
        reason: String,
    },

    /// Registry loading or plan construction error.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Invalid step status transition.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Source status
        from: String,
        /// Target status
        to: String,
    },

    /// Serialization/Deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML registry or configuration error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("Error: {0}")]
    Generic(#[from] eyre::Report),
}

impl FlowError {
    /// Create a session-not-found error.
    pub fn session_not_found(session_id: impl Into<String>) -> Self {
        Self::SessionNotFound(session_id.into())
    }

    /// Create a step-not-found error.
    pub fn step_not_found(session_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self::StepNotFound {
            session_id: session_id.into(),
            step_id: step_id.into(),
        }
    }

    /// Create a resolution error for the given reference.
    pub fn resolution(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create a new construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Create a new invalid transition error.
    pub fn invalid_transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        Self::InvalidTransition {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }

    /// True when the caller named a session or step that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound(_) | Self::StepNotFound { .. })
    }
}
