//! Error types module
//!
//! Configuration errors are raised while options are validated or a storage
//! backend is resolved. They are fatal at setup time and never retried.
//! Storage and processor errors live in their own crates and are unified by
//! `AttachmentError` in `affix-attachment`.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like invalid uploads
    Debug,
    /// Warning level - for transient issues like an unreachable store
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented and logged.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORAGE_UNWRITABLE")
    fn error_code(&self) -> &'static str;

    /// Whether the error describes invalid user input rather than a fault
    fn is_validation_failure(&self) -> bool;

    /// Message suitable for showing to the person who uploaded the file
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unknown storage backend: {0}")]
    UnknownStorage(String),

    #[error("Storage backend {0} is not available in this build")]
    BackendUnavailable(String),

    #[error("Malformed path template {template:?}: {reason}")]
    MalformedTemplate { template: String, reason: String },

    #[error("Invalid credentials for {backend} storage: {reason}")]
    InvalidCredentials { backend: String, reason: String },

    #[error("Style name {0:?} is reserved")]
    ReservedStyle(String),

    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("Invalid attachment options: {0}")]
    InvalidOptions(String),

    #[error("Environment configuration error: {0}")]
    Environment(String),
}

impl ErrorMetadata for ConfigurationError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigurationError::UnknownStorage(_) => "UNKNOWN_STORAGE",
            ConfigurationError::BackendUnavailable(_) => "STORAGE_UNAVAILABLE",
            ConfigurationError::MalformedTemplate { .. } => "MALFORMED_TEMPLATE",
            ConfigurationError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            ConfigurationError::ReservedStyle(_) => "RESERVED_STYLE",
            ConfigurationError::UnknownStyle(_) => "UNKNOWN_STYLE",
            ConfigurationError::InvalidOptions(_) => "INVALID_OPTIONS",
            ConfigurationError::Environment(_) => "ENVIRONMENT_ERROR",
        }
    }

    fn is_validation_failure(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        "Attachment storage is misconfigured".to_string()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}
