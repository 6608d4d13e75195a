#[cfg(feature = "storage-local")]
use crate::local::{LocalCredentials, LocalStorage};
#[cfg(feature = "storage-s3")]
use crate::s3::{S3Credentials, S3Storage};
use crate::{Storage, StorageBackend, StorageError};
use affix_core::{ConfigurationError, StorageConfig};
#[cfg(any(feature = "storage-local", feature = "storage-s3"))]
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Failure to resolve a backend from configuration
#[derive(Debug, Error)]
pub enum StorageSetupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(any(feature = "storage-local", feature = "storage-s3"))]
fn parse_credentials<T: DeserializeOwned>(
    backend: StorageBackend,
    config: &StorageConfig,
) -> Result<T, ConfigurationError> {
    serde_json::from_value(config.credentials.clone()).map_err(|e| {
        ConfigurationError::InvalidCredentials {
            backend: backend.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, StorageSetupError> {
    let backend = config.backend()?;

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let credentials: S3Credentials = parse_credentials(backend, config)?;
            let storage = S3Storage::new(credentials)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(ConfigurationError::BackendUnavailable(
            "s3 (storage-s3 feature not enabled)".to_string(),
        )
        .into()),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let credentials: LocalCredentials = parse_credentials(backend, config)?;
            let storage = LocalStorage::from_credentials(credentials).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(ConfigurationError::BackendUnavailable(
            "filesystem (storage-local feature not enabled)".to_string(),
        )
        .into()),
    }
}
