//! Affix Core Library
//!
//! This crate provides the configuration, path templates, owner capability and
//! error types shared by the storage, processing and attachment crates.

pub mod config;
pub mod error;
pub mod owner;
pub mod storage_types;
pub mod template;

// Re-export commonly used types
pub use config::{AttachmentOptions, StorageConfig, StyleOptions, ORIGINAL_STYLE};
pub use error::{ConfigurationError, ErrorMetadata, LogLevel};
pub use owner::{AttachmentField, AttachmentOwner, FieldValue};
pub use storage_types::StorageBackend;
pub use template::{PathTemplate, PathVariables};
