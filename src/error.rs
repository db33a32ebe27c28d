//! Error types for the sqlbridge access layer.
//!
//! This module defines all error types using `thiserror`. Each variant maps to
//! one failure class of the layer: configuration, driver resolution, connect,
//! statement execution, result dispatch, and resource loading. Close and
//! driver-registration failures are deliberately absent here as propagated
//! values; policy is to log and swallow them at the call site.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unknown driver '{name}'")]
    UnknownDriver { name: String },

    #[error("No registered driver accepts the connection URL (scheme: {scheme})")]
    DriverNotFound { scheme: String },

    #[error("Connection failed: {message}")]
    Connect { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42601" for a syntax error
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Result handler failed: {source}")]
    Dispatch {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to read {path}: {source}")]
    Resource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown-driver error.
    pub fn unknown_driver(name: impl Into<String>) -> Self {
        Self::UnknownDriver { name: name.into() }
    }

    /// Create a driver-not-found error. Takes the URL scheme only; full
    /// connection URLs may carry credentials and never appear in errors.
    pub fn driver_not_found(scheme: impl Into<String>) -> Self {
        Self::DriverNotFound {
            scheme: scheme.into(),
        }
    }

    /// Create a connect error with a helpful suggestion.
    pub fn connect(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a dispatch error from a handler failure.
    pub fn dispatch(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Dispatch {
            source: source.into(),
        }
    }

    /// Create a resource error for an unreadable file.
    pub fn resource(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connect { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Whether this error came from the configuration store rather than the
    /// database. Callers use this to distinguish "fix your setup" from
    /// "fix your SQL".
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
