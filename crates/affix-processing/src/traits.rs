//! Core traits for style processing
//!
//! A processor turns the source file of an attachment into the file stored for
//! one style. Every external tool follows the same contract: a missing binary
//! is a deployment problem, a non-zero exit means the upload is not valid
//! input for that processor.

use affix_core::StyleOptions;
use async_trait::async_trait;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The external tool is not installed or not on `PATH`
    #[error("Processing tool not found: {tool}")]
    ToolMissing { tool: String },

    /// The tool rejected the input; `message` is safe to show to the uploader
    #[error("{message}")]
    ProcessingFailed { message: String, details: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for processor operations
pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// Read-only metadata about the attachment being processed
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    pub attachment: String,
    pub owner_id: String,
    /// Filename supplied by the uploader, if known
    pub original_filename: Option<String>,
}

/// Everything a processor needs for one style
#[derive(Debug, Clone, Copy)]
pub struct ProcessorInput<'a> {
    pub source: &'a Path,
    pub style_name: &'a str,
    pub style: &'a StyleOptions,
    pub context: &'a ProcessingContext,
}

impl ProcessorInput<'_> {
    /// Extension for the output file: the style's declared extension, else the
    /// original filename's, else the source path's.
    pub fn output_extension(&self) -> String {
        if let Some(extension) = self.style.normalized_extension() {
            return extension;
        }
        self.context
            .original_filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .or_else(|| self.source.extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Name of the input used in user-facing messages
    pub fn display_name(&self) -> String {
        self.context
            .original_filename
            .clone()
            .or_else(|| {
                self.source
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "file".to_string())
    }
}

/// A derived file produced by a processor
///
/// Owns its temporary file: dropping the value deletes the file.
#[derive(Debug)]
pub struct ProcessedFile {
    file: NamedTempFile,
    extension: String,
}

impl ProcessedFile {
    pub fn new(file: NamedTempFile, extension: impl Into<String>) -> Self {
        Self {
            file,
            extension: extension.into(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Extension with its leading dot, or empty
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn into_temp_file(self) -> NamedTempFile {
        self.file
    }
}

/// Style processor trait
#[async_trait]
pub trait Processor: Send + Sync {
    /// Short name used in logs (e.g., "audio")
    fn name(&self) -> &str;

    /// Produce the file for one style from the source file
    async fn process(&self, input: ProcessorInput<'_>) -> ProcessorResult<ProcessedFile>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(original: Option<&str>) -> ProcessingContext {
        ProcessingContext {
            attachment: "track".to_string(),
            owner_id: "7".to_string(),
            original_filename: original.map(String::from),
        }
    }

    #[test]
    fn test_output_extension_prefers_style() {
        let style = StyleOptions::default().with_extension("mp3");
        let ctx = context(Some("song.wav"));
        let input = ProcessorInput {
            source: Path::new("/tmp/upload.wav"),
            style_name: "small",
            style: &style,
            context: &ctx,
        };
        assert_eq!(input.output_extension(), ".mp3");
    }

    #[test]
    fn test_output_extension_follows_original_filename() {
        let style = StyleOptions::default();
        let ctx = context(Some("song.wav"));
        let input = ProcessorInput {
            source: Path::new("/tmp/php123.tmp"),
            style_name: "small",
            style: &style,
            context: &ctx,
        };
        assert_eq!(input.output_extension(), ".wav");

        let input = ProcessorInput {
            source: Path::new("/tmp/upload"),
            ..input
        };
        assert_eq!(input.output_extension(), ".wav");
    }

    #[test]
    fn test_output_extension_falls_back_to_source() {
        let style = StyleOptions::default();
        let ctx = context(Some("README"));
        let input = ProcessorInput {
            source: Path::new("/tmp/upload.flac"),
            style_name: "small",
            style: &style,
            context: &ctx,
        };
        assert_eq!(input.output_extension(), ".flac");

        let ctx = context(None);
        let input = ProcessorInput {
            source: Path::new("/tmp/upload"),
            context: &ctx,
            ..input
        };
        assert_eq!(input.output_extension(), "");
    }

    #[test]
    fn test_display_name() {
        let style = StyleOptions::default();
        let ctx = context(Some("song.wav"));
        let input = ProcessorInput {
            source: Path::new("/tmp/upload-123"),
            style_name: "small",
            style: &style,
            context: &ctx,
        };
        assert_eq!(input.display_name(), "song.wav");

        let ctx = context(None);
        let input = ProcessorInput {
            context: &ctx,
            ..input
        };
        assert_eq!(input.display_name(), "upload-123");
    }

    #[test]
    fn test_processing_failed_displays_message_only() {
        let err = ProcessorError::ProcessingFailed {
            message: "song.txt is not a valid audio file".to_string(),
            details: "lame: unsupported input".to_string(),
        };
        assert_eq!(err.to_string(), "song.txt is not a valid audio file");
    }
}
