//! Affix Processing Library
//!
//! This crate provides the `Processor` contract for deriving styles from an
//! upload, the shared external-command runner, and the audio processor.

pub mod command;
pub mod traits;

#[cfg(feature = "audio")]
pub mod audio;

// Re-export commonly used types
pub use command::{CommandLine, CommandProcessor};
pub use traits::{
    ProcessedFile, ProcessingContext, Processor, ProcessorError, ProcessorInput, ProcessorResult,
};

#[cfg(feature = "audio")]
pub use audio::AudioProcessor;
