use crate::keys::storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Credentials blob understood by the filesystem backend
#[derive(Debug, Clone, Deserialize)]
pub struct LocalCredentials {
    /// Root directory for stored files (e.g., "/var/lib/affix/uploads")
    pub root: PathBuf,
    /// Asset host used for URLs (e.g., "assets.example.com")
    pub host: String,
}

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
    host: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating `root` if needed
    pub async fn new(root: impl Into<PathBuf>, host: impl Into<String>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::Unwritable {
                path: root.display().to_string(),
                source: e,
            })?;

        Ok(LocalStorage {
            root,
            host: host.into(),
        })
    }

    pub async fn from_credentials(credentials: LocalCredentials) -> StorageResult<Self> {
        Self::new(credentials.root, credentials.host).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an attachment path onto a file below the root
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        Ok(self.root.join(storage_key(path)?))
    }

    /// Sibling of `target` used while a write is in flight
    fn staging_path(target: &Path) -> PathBuf {
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }

    async fn write_staged(source: &Path, staging: &Path) -> StorageResult<u64> {
        let unwritable = |e| StorageError::Unwritable {
            path: staging.display().to_string(),
            source: e,
        };

        let mut input = fs::File::open(source)
            .await
            .map_err(|e| StorageError::SourceUnreadable {
                path: source.display().to_string(),
                source: e,
            })?;
        let mut output = fs::File::create(staging).await.map_err(unwritable)?;
        let bytes = tokio::io::copy(&mut input, &mut output)
            .await
            .map_err(unwritable)?;
        output.sync_all().await.map_err(unwritable)?;

        Ok(bytes)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(&self, source: &Path, path: &str) -> StorageResult<()> {
        let target = self.resolve(path)?;
        let start = std::time::Instant::now();

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Unwritable {
                    path: parent.display().to_string(),
                    source: e,
                })?;
        }

        let staging = Self::staging_path(&target);
        let size = match Self::write_staged(source, &staging).await {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                tracing::error!(
                    error = %e,
                    path = %target.display(),
                    "Local storage save failed"
                );
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&staging, &target).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::Unwritable {
                path: target.display().to_string(),
                source: e,
            });
        }

        tracing::info!(
            path = %target.display(),
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage save successful"
        );

        Ok(())
    }

    async fn destroy(&self, path: &str) -> StorageResult<()> {
        let target = self.resolve(path)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&target).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::Unwritable {
                    path: target.display().to_string(),
                    source: e,
                })
            }
        }

        tracing::info!(
            path = %target.display(),
            key = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage destroy successful"
        );

        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let target = self.resolve(path)?;
        Ok(fs::try_exists(&target).await.unwrap_or(false))
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn source_file(dir: &Path, contents: &[u8]) -> PathBuf {
        let path = dir.join("upload.bin");
        fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_local_storage_save_creates_intermediate_dirs() {
        let uploads = tempdir().unwrap();
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "assets.example.com")
            .await
            .unwrap();

        let source = source_file(uploads.path(), b"png bytes").await;
        storage
            .save(&source, "/avatar/original/42.png")
            .await
            .unwrap();

        let stored = root.path().join("avatar/original/42.png");
        assert_eq!(fs::read(&stored).await.unwrap(), b"png bytes");
        assert!(storage.exists("/avatar/original/42.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_local_storage_save_leaves_no_staging_files() {
        let uploads = tempdir().unwrap();
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "assets.example.com")
            .await
            .unwrap();

        let source = source_file(uploads.path(), b"v1").await;
        storage.save(&source, "/track/original/7.mp3").await.unwrap();
        let source = source_file(uploads.path(), b"v2").await;
        storage.save(&source, "/track/original/7.mp3").await.unwrap();

        let dir = root.path().join("track/original");
        let mut entries = fs::read_dir(&dir).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["7.mp3".to_string()]);
        assert_eq!(fs::read(dir.join("7.mp3")).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_local_storage_missing_source() {
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "assets.example.com")
            .await
            .unwrap();

        let result = storage
            .save(&root.path().join("missing.bin"), "/avatar/original/1.png")
            .await;
        assert!(matches!(result, Err(StorageError::SourceUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_local_storage_destroy() {
        let uploads = tempdir().unwrap();
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "assets.example.com")
            .await
            .unwrap();

        let source = source_file(uploads.path(), b"data").await;
        storage.save(&source, "/avatar/thumb/3.jpg").await.unwrap();
        storage.destroy("/avatar/thumb/3.jpg").await.unwrap();

        assert!(!storage.exists("/avatar/thumb/3.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_local_storage_destroy_nonexistent() {
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "assets.example.com")
            .await
            .unwrap();

        let result = storage.destroy("/nonexistent/file.txt").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path(), "assets.example.com")
            .await
            .unwrap();

        let result = storage.destroy("/../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = storage.exists("/avatar/../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_local_storage_host() {
        let root = tempdir().unwrap();
        let storage = LocalStorage::from_credentials(LocalCredentials {
            root: root.path().to_path_buf(),
            host: "cdn.example.com".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(storage.host(), "cdn.example.com");
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
