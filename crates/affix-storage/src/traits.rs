//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Permission, space or other local write failure
    #[error("Cannot write {path}: {source}")]
    Unwritable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Network-backed store could not be reached or refused the request
    #[error("Storage unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Cannot read source file {path}: {source}")]
    SourceUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so an
/// attachment can persist files without knowing where they end up.
///
/// **Path format:** attachment paths as rendered from the path template, e.g.
/// `/avatar/original/42.png`. See the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist the file at `source` under `path`, creating intermediate
    /// structure as needed. Readers never observe a partially written file.
    async fn save(&self, source: &Path, path: &str) -> StorageResult<()>;

    /// Remove whatever is stored at `path`. Removing a missing path succeeds.
    async fn destroy(&self, path: &str) -> StorageResult<()>;

    /// Check whether something is stored at `path`
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Host (optionally with a prefix) that absolute URLs are built against
    fn host(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
