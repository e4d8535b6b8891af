//! Request-level error kinds for subtitle generation

use crate::llm::LLMError;
use crate::video::MetadataError;

/// Message returned to clients when a required field is missing
pub const VALIDATION_MESSAGE: &str = "Video URL and language are required.";

/// Message returned to clients for every upstream failure
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate subtitles. Please check the video link and try again.";

/// Error types for a single subtitle request
#[derive(thiserror::Error, Debug)]
pub enum SubtitleError {
    #[error("Missing required field(s): {0}")]
    Validation(String),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Model error: {0}")]
    Model(#[from] LLMError),
}

impl SubtitleError {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            SubtitleError::Validation(_) => "validation",
            SubtitleError::Metadata(_) => "upstream-metadata",
            SubtitleError::Model(_) => "upstream-model",
        }
    }

    /// True when the caller sent a bad request
    pub fn is_client_error(&self) -> bool {
        matches!(self, SubtitleError::Validation(_))
    }

    /// Message safe to show to the caller. Upstream causes are never exposed.
    pub fn public_message(&self) -> &'static str {
        if self.is_client_error() {
            VALIDATION_MESSAGE
        } else {
            GENERATION_FAILED_MESSAGE
        }
    }
}
