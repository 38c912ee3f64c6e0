use std::fmt;

use intentflow_core::error::FlowError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

/// Why an API call could not produce a result
///
/// The `Display` text of [`ToolError::Http`] is what callers see as the
/// step error, so it keeps the upstream status and detail verbatim.
#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("No route for API call: {0}")]
    NotFound(String),

    #[error("Bad call parameters: {0}")]
    InvalidParameters(String),

    #[error("Parameter '{field}' {message}")]
    InvalidField { field: String, message: String },

    #[error("API returned error {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("API request failed: {0}")]
    Network(String),

    #[error("API call timed out: {0}")]
    Timeout(String),

    #[error("Handler failed: {0}")]
    Execution(String),

    #[error("Malformed payload: {0}")]
    Serialization(String),

    #[error("Integration not configured: {0}")]
    Configuration(String),

    #[error("Dispatcher fault: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// `message` reads after the field name: "is required", "must be a string"
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::Http {
            status,
            detail: detail.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Missing API key or endpoint setting for an integration
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Upstream HTTP status, when the call got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::InvalidParameters(_) | Self::InvalidField { .. } => ErrorCategory::InvalidInput,
            Self::Http { status, .. } => ErrorCategory::from_status(*status),
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Execution(_) => ErrorCategory::Execution,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// A retry of the same step, unchanged, might succeed
    pub fn is_retryable(&self) -> bool {
        self.category().is_transient()
    }

    /// The step needs different parameters or credentials
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::InvalidInput | ErrorCategory::Authentication | ErrorCategory::NotFound
        )
    }
}

/// Coarse classification used in logs and retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Execution,
    Serialization,
    Configuration,
    ExternalService,
    Internal,
}

impl ErrorCategory {
    fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            404 => Self::NotFound,
            408 => Self::Timeout,
            429 => Self::RateLimit,
            500..=599 => Self::ExternalService,
            _ => Self::InvalidInput,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimit | Self::ExternalService
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::Authentication => "authentication",
            Self::RateLimit => "rate_limit",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Execution => "execution",
            Self::Serialization => "serialization",
            Self::Configuration => "configuration",
            Self::ExternalService => "external_service",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        match err.status() {
            _ if err.is_timeout() => Self::Timeout(message),
            Some(status) => Self::Http {
                status: status.as_u16(),
                detail: message,
            },
            None if err.is_decode() => Self::Serialization(message),
            None => Self::Network(message),
        }
    }
}

impl From<ToolError> for FlowError {
    fn from(err: ToolError) -> Self {
        if err.is_user_error() || err.category() == ErrorCategory::Configuration {
            FlowError::construction(err.to_string())
        } else {
            FlowError::Generic(eyre::Report::new(err))
        }
    }
}

impl From<FlowError> for ToolError {
    fn from(err: FlowError) -> Self {
        Self::Internal(err.to_string())
    }
}
