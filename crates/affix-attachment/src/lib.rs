//! Affix Attachment Library
//!
//! Binds uploaded files to owner records. An [`Attachment`] computes per-style
//! paths and URLs from the owner's metadata, persists the original and every
//! configured style through a [`Storage`] backend, and runs an optional
//! [`Processor`] to derive styles.

pub mod attachment;
pub mod error;
pub mod upload;

// Re-export commonly used types
pub use affix_core::{
    AttachmentField, AttachmentOptions, AttachmentOwner, ConfigurationError, ErrorMetadata,
    FieldValue, LogLevel, StorageConfig, StyleOptions, ORIGINAL_STYLE,
};
pub use affix_processing::{ProcessingContext, Processor, ProcessorError};
pub use affix_storage::{create_storage, Storage, StorageError};
pub use attachment::Attachment;
pub use error::AttachmentError;
pub use upload::UploadedFile;
