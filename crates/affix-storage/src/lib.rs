//! Affix Storage Library
//!
//! This crate provides the `Storage` contract and its filesystem and
//! S3-compatible implementations.
//!
//! # Path format
//!
//! Backends receive the rendered attachment path, e.g. `/avatar/original/42.png`.
//! A single leading `/` is dropped before the path is mapped to a file or an
//! object key, and paths containing `..` segments are rejected. Normalization
//! lives in the `keys` module so all backends agree.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use affix_core::StorageBackend;
pub use factory::{create_storage, StorageSetupError};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
