//! External command invocation shared by all processors
//!
//! Tools are run with an argument vector, never through a shell, so
//! filenames and presets are passed to the tool verbatim.

use crate::traits::{ProcessedFile, ProcessorError, ProcessorInput, ProcessorResult};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Argument list for one tool invocation
///
/// Text arguments are trimmed and blank ones dropped, and an option whose
/// value is absent or blank is left out together with its flag. Omitted
/// optional arguments therefore never leave empty slots in the argv.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: &str) -> Self {
        let arg = arg.trim();
        if !arg.is_empty() {
            self.args.push(OsString::from(arg));
        }
        self
    }

    /// Add `flag value` when `value` is present and not blank
    pub fn option(self, flag: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => self.arg(flag).arg(value),
            None => self,
        }
    }

    /// Add a path untouched
    pub fn path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_owned());
        self
    }

    pub fn args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arg in &self.args {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs an external tool that reads a source file and writes a destination file
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    tool: String,
    medium: String,
}

impl CommandProcessor {
    /// `medium` names the kind of input the tool accepts (e.g. "audio") and
    /// appears in the message of a failed run.
    pub fn new(tool: impl Into<String>, medium: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            medium: medium.into(),
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn medium(&self) -> &str {
        &self.medium
    }

    /// Create the output file, let `build` produce the argv for
    /// `(source, destination)`, run the tool and interpret its exit status.
    pub async fn run<F>(&self, input: &ProcessorInput<'_>, build: F) -> ProcessorResult<ProcessedFile>
    where
        F: FnOnce(&Path, &Path) -> CommandLine,
    {
        let extension = input.output_extension();
        let output = tempfile::Builder::new()
            .prefix("affix-")
            .suffix(&extension)
            .tempfile()?;

        let command_line = build(input.source, output.path());
        let start = std::time::Instant::now();

        tracing::debug!(
            tool = %self.tool,
            args = %command_line,
            style = %input.style_name,
            "Running processor command"
        );

        let result = Command::new(&self.tool)
            .args(command_line.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!(tool = %self.tool, "Processing tool not found");
                return Err(ProcessorError::ToolMissing {
                    tool: self.tool.clone(),
                });
            }
            Err(e) => return Err(ProcessorError::Io(e)),
        };

        if !result.status.success() {
            let details = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::debug!(
                tool = %self.tool,
                status = ?result.status.code(),
                stderr = %details,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Processor rejected input"
            );
            return Err(ProcessorError::ProcessingFailed {
                message: format!(
                    "{} is not a valid {} file",
                    input.display_name(),
                    self.medium
                ),
                details,
            });
        }

        tracing::info!(
            tool = %self.tool,
            style = %input.style_name,
            attachment = %input.context.attachment,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Processor command succeeded"
        );

        Ok(ProcessedFile::new(output, extension))
    }
}
