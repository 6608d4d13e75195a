//! Audio processor - transcoding through the `lame` encoder
//!
//! Invocation: `lame [--preset <value>] <source> <destination>`.

use crate::command::{CommandLine, CommandProcessor};
use crate::traits::{ProcessedFile, Processor, ProcessorInput, ProcessorResult};
use async_trait::async_trait;
use std::env;
use std::path::Path;

pub const DEFAULT_LAME_PATH: &str = "lame";

pub struct AudioProcessor {
    command: CommandProcessor,
}

impl AudioProcessor {
    pub fn new(lame_path: impl Into<String>) -> Self {
        Self {
            command: CommandProcessor::new(lame_path, "audio"),
        }
    }

    /// Use `LAME_PATH` when set, otherwise `lame` from `PATH`
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::new(env::var("LAME_PATH").unwrap_or_else(|_| DEFAULT_LAME_PATH.to_string()))
    }

    pub fn tool(&self) -> &str {
        self.command.tool()
    }

    fn command_line(input: &ProcessorInput<'_>, source: &Path, destination: &Path) -> CommandLine {
        CommandLine::new()
            .option("--preset", input.style.preset.as_deref())
            .path(source)
            .path(destination)
    }
}

impl Default for AudioProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_LAME_PATH)
    }
}

#[async_trait]
impl Processor for AudioProcessor {
    fn name(&self) -> &str {
        "audio"
    }

    #[tracing::instrument(skip(self, input), fields(processor = "audio", style = %input.style_name))]
    async fn process(&self, input: ProcessorInput<'_>) -> ProcessorResult<ProcessedFile> {
        self.command
            .run(&input, |source, destination| {
                Self::command_line(&input, source, destination)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ProcessingContext, ProcessorError};
    use affix_core::{AttachmentOptions, StyleOptions};

    fn create_test_processor() -> AudioProcessor {
        AudioProcessor::default()
    }

    #[test]
    fn test_processor_new() {
        let processor = AudioProcessor::new("/opt/lame/bin/lame");
        assert_eq!(processor.tool(), "/opt/lame/bin/lame");
        assert_eq!(create_test_processor().tool(), "lame");
        assert_eq!(create_test_processor().name(), "audio");
    }

    #[test]
    fn test_command_line_with_preset() {
        let style = StyleOptions::default().with_preset("medium");
        let ctx = ProcessingContext::default();
        let input = ProcessorInput {
            source: Path::new("/tmp/in.wav"),
            style_name: "small",
            style: &style,
            context: &ctx,
        };

        let line = AudioProcessor::command_line(
            &input,
            Path::new("/tmp/in.wav"),
            Path::new("/tmp/out.mp3"),
        );
        assert_eq!(line.to_string(), "--preset medium /tmp/in.wav /tmp/out.mp3");
    }

    #[test]
    fn test_command_line_without_preset() {
        let options = AttachmentOptions::from_json(
            r#"{ "styles": { "small": { "extension": "mp3", "preset": "" } } }"#,
        )
        .unwrap();
        let style = options.style("small").unwrap().unwrap();
        let ctx = ProcessingContext::default();
        let input = ProcessorInput {
            source: Path::new("/tmp/in.wav"),
            style_name: "small",
            style,
            context: &ctx,
        };

        let line = AudioProcessor::command_line(
            &input,
            Path::new("/tmp/in.wav"),
            Path::new("/tmp/out.mp3"),
        );
        assert_eq!(line.to_string(), "/tmp/in.wav /tmp/out.mp3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_audio_file_is_rejected() {
        use std::io::Write;

        let mut src = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        src.write_all(b"definitely not audio").unwrap();

        let style = StyleOptions::default().with_extension("mp3");
        let ctx = ProcessingContext {
            attachment: "track".to_string(),
            owner_id: "7".to_string(),
            original_filename: Some("readme.txt".to_string()),
        };
        let input = ProcessorInput {
            source: src.path(),
            style_name: "small",
            style: &style,
            context: &ctx,
        };

        // `false` stands in for an encoder that rejects its input
        let result = AudioProcessor::new("false").process(input).await;

        match result {
            Err(ProcessorError::ProcessingFailed { message, .. }) => {
                assert!(message.contains("is not a valid audio file"));
                assert!(message.starts_with("readme.txt"));
            }
            other => panic!("expected ProcessingFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_encoder() {
        let style = StyleOptions::default();
        let ctx = ProcessingContext::default();
        let input = ProcessorInput {
            source: Path::new("/tmp/in.wav"),
            style_name: "small",
            style: &style,
            context: &ctx,
        };

        let result = AudioProcessor::new("affix-missing-lame").process(input).await;
        assert!(matches!(
            result,
            Err(ProcessorError::ToolMissing { ref tool }) if tool == "affix-missing-lame"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_returns_file() {
        use std::io::Write;

        let mut src = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        src.write_all(b"RIFF....WAVE").unwrap();

        let style = StyleOptions::default();
        let ctx = ProcessingContext::default();
        let input = ProcessorInput {
            source: src.path(),
            style_name: "copy",
            style: &style,
            context: &ctx,
        };

        // `cp` shares the `<source> <destination>` grammar when no preset is set
        let processed = AudioProcessor::new("cp").process(input).await.unwrap();
        assert_eq!(processed.extension(), ".wav");
        assert_eq!(std::fs::read(processed.path()).unwrap(), b"RIFF....WAVE");
    }
}
