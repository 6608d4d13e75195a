//! Audio processing module

pub mod processor;

pub use processor::{AudioProcessor, DEFAULT_LAME_PATH};
