//! Error handling module for the builder core.
//!
//! Field-level malformation is repaired locally with documented defaults and
//! never raised; these error types cover the cases that do surface: rejected
//! saves, failed storage collaborators, absent top-level input and unexpected
//! serialization failures.

use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
    pub const DESERIALIZATION_ERROR: &str = "DESERIALIZATION_ERROR";
}

/// Builder core error type.
#[derive(Debug)]
pub enum BuilderError {
    /// Background configuration fails domain rules. Recoverable; carries the
    /// offending field names so the UI can point at them.
    Validation {
        message: String,
        fields: Vec<String>,
    },
    /// An injected save/restore collaborator failed. Surfaced unchanged,
    /// never retried here.
    Persistence(String),
    /// Required top-level argument was absent. Programmer error, fails fast.
    InvalidInput(String),
    /// Serialization failed after per-field repair was already attempted.
    Serialization(String),
    /// Deserialization failed after per-field repair was already attempted.
    Deserialization(String),
}

impl BuilderError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            BuilderError::Validation { .. } => codes::VALIDATION_ERROR,
            BuilderError::Persistence(_) => codes::PERSISTENCE_ERROR,
            BuilderError::InvalidInput(_) => codes::INVALID_INPUT,
            BuilderError::Serialization(_) => codes::SERIALIZATION_ERROR,
            BuilderError::Deserialization(_) => codes::DESERIALIZATION_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            BuilderError::Validation { message, .. } => message.clone(),
            BuilderError::Persistence(msg) => msg.clone(),
            BuilderError::InvalidInput(msg) => msg.clone(),
            BuilderError::Serialization(msg) => msg.clone(),
            BuilderError::Deserialization(msg) => msg.clone(),
        }
    }

    /// Offending field names for validation errors, empty otherwise.
    pub fn fields(&self) -> &[String] {
        match self {
            BuilderError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for BuilderError {}

impl From<sqlx::Error> for BuilderError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Storage error: {:?}", err);
        BuilderError::Persistence(format!("Storage error: {}", err))
    }
}

impl From<serde_json::Error> for BuilderError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        BuilderError::Serialization(format!("JSON error: {}", err))
    }
}

/// Error details in a reportable envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorDetails {
    pub fn new(error: &BuilderError) -> Self {
        let details = match error {
            BuilderError::Validation { fields, .. } => {
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.message(),
            details,
        }
    }
}
