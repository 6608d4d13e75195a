//! Attachment error type
//!
//! Unifies configuration, storage and processor failures. Nothing here is
//! retried; every error reaches the caller of `save`, `destroy` or the path
//! helpers unchanged.

use affix_core::{ConfigurationError, ErrorMetadata, LogLevel};
use affix_processing::ProcessorError;
use affix_storage::{StorageError, StorageSetupError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

impl From<StorageSetupError> for AttachmentError {
    fn from(err: StorageSetupError) -> Self {
        match err {
            StorageSetupError::Configuration(e) => AttachmentError::Configuration(e),
            StorageSetupError::Storage(e) => AttachmentError::Storage(e),
        }
    }
}

impl AttachmentError {
    /// Message for a field validation error, when the upload itself was rejected
    pub fn validation_message(&self) -> Option<&str> {
        match self {
            AttachmentError::Processor(ProcessorError::ProcessingFailed { message, .. }) => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

impl ErrorMetadata for AttachmentError {
    fn error_code(&self) -> &'static str {
        match self {
            AttachmentError::Configuration(e) => e.error_code(),
            AttachmentError::Storage(StorageError::Unwritable { .. }) => "STORAGE_UNWRITABLE",
            AttachmentError::Storage(StorageError::Unreachable(_)) => "STORAGE_UNREACHABLE",
            AttachmentError::Storage(StorageError::InvalidPath(_)) => "INVALID_STORAGE_PATH",
            AttachmentError::Storage(StorageError::SourceUnreadable { .. }) => "SOURCE_UNREADABLE",
            AttachmentError::Processor(ProcessorError::ToolMissing { .. }) => "PROCESSOR_TOOL_MISSING",
            AttachmentError::Processor(ProcessorError::ProcessingFailed { .. }) => "INVALID_FILE",
            AttachmentError::Processor(ProcessorError::Io(_)) => "PROCESSOR_IO_ERROR",
        }
    }

    fn is_validation_failure(&self) -> bool {
        self.validation_message().is_some()
    }

    fn client_message(&self) -> String {
        match self {
            AttachmentError::Configuration(e) => e.client_message(),
            AttachmentError::Processor(ProcessorError::ProcessingFailed { message, .. }) => {
                message.clone()
            }
            AttachmentError::Storage(StorageError::Unreachable(_)) => {
                "File storage is temporarily unavailable".to_string()
            }
            _ => "The file could not be stored".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AttachmentError::Processor(ProcessorError::ProcessingFailed { .. }) => LogLevel::Debug,
            AttachmentError::Storage(StorageError::Unreachable(_)) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}
