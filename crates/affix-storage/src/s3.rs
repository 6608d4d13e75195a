use crate::keys::storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use affix_core::ConfigurationError;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use serde::Deserialize;
use std::path::Path;

/// Credentials blob understood by the S3 backend
#[derive(Debug, Clone, Deserialize)]
pub struct S3Credentials {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, ...)
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Public host override, e.g. a CDN in front of the bucket
    #[serde(default)]
    pub host: Option<String>,
}

impl S3Credentials {
    /// Host that public URLs are built against.
    ///
    /// AWS uses virtual-hosted style `{bucket}.s3.{region}.amazonaws.com`;
    /// custom endpoints use path style `{endpoint-host}/{bucket}`.
    pub fn public_host(&self) -> String {
        if let Some(ref host) = self.host {
            return host.trim_end_matches('/').to_string();
        }
        match self.endpoint {
            Some(ref endpoint) => {
                let base = endpoint
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .trim_end_matches('/');
                format!("{}/{}", base, self.bucket)
            }
            None => format!("{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// S3 storage implementation
#[derive(Clone, Debug)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    host: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Settings missing from `credentials` fall back to the standard AWS
    /// environment variables. A client that cannot be built from them is a
    /// credentials error.
    pub fn new(credentials: S3Credentials) -> Result<Self, ConfigurationError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(credentials.region.clone())
            .with_bucket_name(credentials.bucket.clone());

        if let Some(ref endpoint) = credentials.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }
        if let Some(ref key_id) = credentials.access_key_id {
            builder = builder.with_access_key_id(key_id.clone());
        }
        if let Some(ref secret) = credentials.secret_access_key {
            builder = builder.with_secret_access_key(secret.clone());
        }

        let store = builder
            .build()
            .map_err(|e| ConfigurationError::InvalidCredentials {
                backend: StorageBackend::S3.to_string(),
                reason: e.to_string(),
            })?;

        Ok(S3Storage {
            store,
            host: credentials.public_host(),
            bucket: credentials.bucket,
        })
    }

    fn location(path: &str) -> StorageResult<ObjectPath> {
        Ok(ObjectPath::from(storage_key(path)?))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn save(&self, source: &Path, path: &str) -> StorageResult<()> {
        let location = Self::location(path)?;
        let data = tokio::fs::read(source)
            .await
            .map_err(|e| StorageError::SourceUnreadable {
                path: source.display().to_string(),
                source: e,
            })?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %location,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 save failed"
            );
            StorageError::Unreachable(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 save successful"
        );

        Ok(())
    }

    async fn destroy(&self, path: &str) -> StorageResult<()> {
        let location = Self::location(path)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %location,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 destroy failed"
                );
                return Err(StorageError::Unreachable(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 destroy successful"
        );

        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let location = Self::location(path)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::Unreachable(e.to_string())),
        }
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(all(test, feature = "storage-s3"))]
mod tests {
    use super::*;

    fn credentials() -> S3Credentials {
        S3Credentials {
            bucket: "uploads".to_string(),
            region: "eu-west-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            host: None,
        }
    }

    #[test]
    fn test_public_host_aws() {
        assert_eq!(
            credentials().public_host(),
            "uploads.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_public_host_custom_endpoint() {
        let creds = S3Credentials {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..credentials()
        };
        assert_eq!(creds.public_host(), "localhost:9000/uploads");
    }

    #[test]
    fn test_public_host_override() {
        let creds = S3Credentials {
            endpoint: Some("https://nyc3.digitaloceanspaces.com".to_string()),
            host: Some("cdn.example.com/".to_string()),
            ..credentials()
        };
        assert_eq!(creds.public_host(), "cdn.example.com");
    }

    #[test]
    fn test_credentials_deserialize_with_optional_fields() {
        let creds: S3Credentials = serde_json::from_value(serde_json::json!({
            "bucket": "uploads",
            "region": "us-east-1",
            "endpoint": "http://minio:9000"
        }))
        .unwrap();
        assert_eq!(creds.endpoint.as_deref(), Some("http://minio:9000"));
        assert!(creds.access_key_id.is_none());
    }

    #[test]
    fn test_incomplete_static_keys_are_invalid_credentials() {
        let creds = S3Credentials {
            access_key_id: Some("AKIAEXAMPLE".to_string()),
            ..credentials()
        };
        let result = S3Storage::new(creds);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidCredentials { ref backend, .. }) if backend == "s3"
        ));
    }

    #[test]
    fn test_location_strips_leading_slash() {
        let location = S3Storage::location("/avatar/original/42.png").unwrap();
        assert_eq!(location.as_ref(), "avatar/original/42.png");
    }
}
