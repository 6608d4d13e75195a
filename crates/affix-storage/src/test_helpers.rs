//! Mock Storage implementation for testing

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock storage that keeps files in memory and counts every call
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    destroyed: Arc<Mutex<Vec<String>>>,
    save_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
    fail_saves: Mutex<Option<String>>,
    host: String,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::with_host("mock.example.com")
    }

    pub fn with_host(host: impl Into<String>) -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            destroyed: Arc::new(Mutex::new(Vec::new())),
            save_calls: AtomicUsize::new(0),
            destroy_calls: AtomicUsize::new(0),
            fail_saves: Mutex::new(None),
            host: host.into(),
        }
    }

    /// Make every save to `path` fail as unreachable
    pub fn fail_saves_to(&self, path: &str) {
        *self.fail_saves.lock().unwrap() = Some(path.to_string());
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    /// Paths passed to `destroy`, in call order
    pub fn destroyed_paths(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }

    /// Set a file in the mock storage
    pub fn set_file(&self, path: &str, data: Vec<u8>) {
        self.files.lock().unwrap().insert(path.to_string(), data);
    }

    /// Check if a file exists in the mock storage
    pub fn has_file(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    /// Get file data (for test assertions)
    pub fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Stored paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn save(&self, source: &Path, path: &str) -> StorageResult<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_saves.lock().unwrap().as_deref() == Some(path) {
            return Err(StorageError::Unreachable(format!("mock refused {}", path)));
        }

        let data = tokio::fs::read(source)
            .await
            .map_err(|e| StorageError::SourceUnreadable {
                path: source.display().to_string(),
                source: e,
            })?;
        self.files.lock().unwrap().insert(path.to_string(), data);
        Ok(())
    }

    async fn destroy(&self, path: &str) -> StorageResult<()> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        self.destroyed.lock().unwrap().push(path.to_string());
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
