//! External collaborator seams.
//!
//! Each returns one text blob; everything past that point is owned by this crate.

use async_trait::async_trait;
use delulu_core::{ImageSource, OutputMode, Result};

/// Reads the literal conversation text shown in an image.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, image: &ImageSource) -> Result<String>;
}

/// Produces an assessment of a conversation corpus in the requested format.
#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, corpus: &str, mode: OutputMode) -> Result<String>;
}

/// Writes a short, independent synopsis of one conversation.
#[async_trait]
pub trait Synopsizer: Send + Sync {
    async fn synopsize(&self, text: &str) -> Result<String>;
}
