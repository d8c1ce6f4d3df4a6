//! Error types for MultiAuth.
//!
//! The passcode registry itself never fails. `MultiAuthError` covers the
//! surfaces around it: caller input rejected before it reaches the registry,
//! configuration loading, and runtime setup.

use thiserror::Error;

/// The main error type for MultiAuth operations.
#[derive(Debug, Error)]
pub enum MultiAuthError {
    // ==================== Validation Errors ====================
    /// A field value is invalid.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    // ==================== Configuration Errors ====================
    /// The configuration is invalid or could not be parsed.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Reading or binding a resource failed.
    #[error("IO error: {message}")]
    Io { message: String },

    // ==================== Runtime Errors ====================
    /// A runtime facility (e.g. the async executor) is unavailable.
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl MultiAuthError {
    /// Creates a new invalid input error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a user-facing error (vs internal).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Returns an HTTP status code appropriate for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 422,
            _ => 500,
        }
    }
}

/// A Result type alias using MultiAuthError.
pub type MultiAuthResult<T> = Result<T, MultiAuthError>;

impl From<std::io::Error> for MultiAuthError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
