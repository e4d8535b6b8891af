//! Subtitle Service
//!
//! Web service that looks up a video's metadata, asks a generative text model
//! to translate the transcript into a target language, and returns the result
//! as fixed-size subtitle segments.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod subtitles;
pub mod video;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::SubtitleError;
pub use crate::llm::{create_llm, LLMConfig, LLMProvider, LLM};
pub use crate::subtitles::{chunk_words, SubtitleGenerator, SubtitleRequest, SubtitleSegment};
pub use crate::video::{MetadataResolver, VideoMetadata, YouTubeResolver};
