use std::path::PathBuf;

/// Result type alias for connection resolution operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for connection resolution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed configuration text
    #[error("failed to parse configuration '{origin}': {message}")]
    Parse {
        origin: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// A connection name absent from the consulted document
    #[error("connection '{name}' not found")]
    NotFound { name: String },

    /// Resolution refused because project-only isolation is active and no
    /// project configuration file was discovered
    #[error(
        "connection '{name}' is unavailable: projectConnectionsOnly is enabled and no project configuration file was found"
    )]
    ProjectOnlyViolation { name: String },

    /// Errors raised by a connection factory while creating a connection
    #[error("failed to create '{kind}' connection: {message}")]
    Factory {
        kind: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Secret resolution errors
    #[error("failed to resolve secret '{key}': {message}")]
    SecretResolution { key: String, message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Parse {
            origin: "<json>".to_string(),
            message: error.to_string(),
            source: Some(error),
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a parse error without an underlying JSON error
    #[must_use]
    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            origin: origin.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error wrapping the JSON error that caused it
    #[must_use]
    pub fn parse_json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Parse {
            origin: origin.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Error::NotFound { name: name.into() }
    }

    #[must_use]
    pub fn project_only_violation(name: impl Into<String>) -> Self {
        Error::ProjectOnlyViolation { name: name.into() }
    }

    /// Create a factory error
    #[must_use]
    pub fn factory(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Factory {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a factory error with a source error
    #[must_use]
    pub fn factory_with_source(
        kind: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Factory {
            kind: kind.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a secret resolution error
    #[must_use]
    pub fn secret_resolution(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::SecretResolution {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Whether this error means the name was simply not defined
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
