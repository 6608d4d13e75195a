//! Uploaded source files

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug)]
enum Source {
    /// Temporary upload, deleted when the value is dropped
    Temp(NamedTempFile),
    /// File owned by the caller
    Path(PathBuf),
}

/// A file assigned to an attachment, with the name the uploader gave it
#[derive(Debug)]
pub struct UploadedFile {
    source: Source,
    original_filename: String,
    size: u64,
}

impl UploadedFile {
    /// Wrap a file that stays owned by the caller
    pub async fn from_path(
        path: impl Into<PathBuf>,
        original_filename: impl Into<String>,
    ) -> io::Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self {
            source: Source::Path(path),
            original_filename: original_filename.into(),
            size,
        })
    }

    /// Take ownership of a temporary upload
    pub fn from_temp_file(
        file: NamedTempFile,
        original_filename: impl Into<String>,
    ) -> io::Result<Self> {
        let size = file.as_file().metadata()?.len();
        Ok(Self {
            source: Source::Temp(file),
            original_filename: original_filename.into(),
            size,
        })
    }

    /// Spool in-memory bytes to a temporary file
    pub fn from_bytes(original_filename: impl Into<String>, data: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new().prefix("affix-upload-").tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        Ok(Self {
            source: Source::Temp(file),
            original_filename: original_filename.into(),
            size: data.len() as u64,
        })
    }

    pub fn path(&self) -> &Path {
        match &self.source {
            Source::Temp(file) => file.path(),
            Source::Path(path) => path,
        }
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// Byte length of the upload
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Extension of the original filename with its leading dot, or empty
    pub fn extension(&self) -> String {
        Path::new(self.base_name())
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Original filename reduced to a safe base name
    ///
    /// Directory components from the client are dropped and every character
    /// outside `[A-Za-z0-9._-]` becomes `_`.
    pub fn identifier(&self) -> String {
        self.base_name()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn base_name(&self) -> &str {
        self.original_filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.original_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_metadata() {
        let upload = UploadedFile::from_bytes("photo.PNG", b"12345").unwrap();
        assert_eq!(upload.size(), 5);
        assert_eq!(upload.extension(), ".PNG");
        assert_eq!(upload.identifier(), "photo.PNG");
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"12345");
    }

    #[test]
    fn test_extension_missing() {
        let upload = UploadedFile::from_bytes("README", b"").unwrap();
        assert_eq!(upload.extension(), "");
        assert_eq!(upload.size(), 0);
    }

    #[test]
    fn test_identifier_strips_client_directories() {
        let upload = UploadedFile::from_bytes("C:\\Users\\me\\my song (1).mp3", b"x").unwrap();
        assert_eq!(upload.identifier(), "my_song__1_.mp3");
        assert_eq!(upload.extension(), ".mp3");

        let upload = UploadedFile::from_bytes("../../etc/passwd", b"x").unwrap();
        assert_eq!(upload.identifier(), "passwd");
    }

    #[test]
    fn test_temp_file_is_removed_on_drop() {
        let upload = UploadedFile::from_bytes("a.txt", b"bye").unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_from_path_keeps_caller_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        tokio::fs::write(&path, b"RIFF").await.unwrap();

        let upload = UploadedFile::from_path(&path, "clip.wav").await.unwrap();
        assert_eq!(upload.size(), 4);
        drop(upload);
        assert!(path.exists());
    }

    #[test]
    fn test_from_temp_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        let upload = UploadedFile::from_temp_file(file, "a.ogg").unwrap();
        assert_eq!(upload.size(), 3);
        assert_eq!(upload.extension(), ".ogg");
    }
}
