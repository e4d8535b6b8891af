//! Subtitle generation: validate the request, look up the video, ask the
//! model for a translation and split it into fixed-size word segments.
//!
//! There is no speech-to-text step. Every video is translated from the same
//! placeholder English transcript and segments carry no timing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SubtitleConfig;
use crate::error::SubtitleError;
use crate::llm::{LLMProvider, LLM};
use crate::video::MetadataResolver;

/// Number of words per segment unless configured otherwise
pub const DEFAULT_WORDS_PER_SEGMENT: usize = 5;

/// English transcript used in place of real audio transcription
pub const PLACEHOLDER_TRANSCRIPT: &str = "Hello everyone and welcome to this video tutorial. \
In this segment, we will be discussing the fundamental concepts of full-stack web development. \
First, we will cover the basics of a client-server architecture. \
On the client side, we use languages like HTML, CSS, and JavaScript. \
On the server side, we use frameworks like Python and Flask to handle requests and data. \
This separation is crucial for building scalable and maintainable applications. \
Thank you for watching and stay tuned for more!";

/// Incoming request body. Fields are optional so that missing values are
/// reported as a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitleRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// One unit of subtitle text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    pub text: String,
}

impl SubtitleRequest {
    pub fn new(url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            language: Some(language.into()),
        }
    }

    /// Return `(url, language)` when both are present and non-empty
    pub fn validate(&self) -> Result<(&str, &str), SubtitleError> {
        let url = self.url.as_deref().filter(|s| !s.is_empty());
        let language = self.language.as_deref().filter(|s| !s.is_empty());

        match (url, language) {
            (Some(url), Some(language)) => Ok((url, language)),
            (None, Some(_)) => Err(SubtitleError::Validation("url".to_string())),
            (Some(_), None) => Err(SubtitleError::Validation("language".to_string())),
            (None, None) => Err(SubtitleError::Validation("url, language".to_string())),
        }
    }
}

/// Build the translation instruction sent to the model
pub fn build_translation_prompt(language: &str, title: &str, transcript: &str) -> String {
    format!(
        "Translate the following English transcript into {language}.\n\
        Make sure the translation is context-aware and sounds natural.\n\
        The original video is titled \"{title}\".\n\
        \n\
        Original Transcript:\n\
        {transcript}\n"
    )
}

/// Split text on whitespace and group the words into segments of
/// `words_per_segment`, preserving order. Empty input yields no segments.
pub fn chunk_words(text: &str, words_per_segment: usize) -> Vec<SubtitleSegment> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(words_per_segment.max(1))
        .map(|chunk| SubtitleSegment {
            text: chunk.join(" "),
        })
        .collect()
}

/// Runs the metadata → model → chunking pipeline for one request.
///
/// Holds the process-wide model client and resolver handles; both are
/// immutable once constructed, so one generator serves every request.
pub struct SubtitleGenerator {
    llm: Arc<dyn LLM>,
    resolver: Arc<dyn MetadataResolver>,
    words_per_segment: usize,
}

impl SubtitleGenerator {
    pub fn new(
        llm: Arc<dyn LLM>,
        resolver: Arc<dyn MetadataResolver>,
        config: &SubtitleConfig,
    ) -> Self {
        Self {
            llm,
            resolver,
            words_per_segment: config.words_per_segment,
        }
    }

    pub fn provider_type(&self) -> LLMProvider {
        self.llm.provider_type()
    }

    /// Generate subtitles for a request, validating it first
    pub async fn generate(
        &self,
        request: &SubtitleRequest,
    ) -> Result<Vec<SubtitleSegment>, SubtitleError> {
        let (url, language) = request.validate()?;

        let metadata = self.resolver.resolve(url).await?;
        info!(
            "🎬 Processing video: \"{}\" (Duration: {}s)",
            metadata.title,
            metadata.duration.as_secs()
        );

        let prompt = build_translation_prompt(language, &metadata.title, PLACEHOLDER_TRANSCRIPT);
        let response = self.llm.generate(&prompt).await?;
        debug!(
            "Model returned {} characters ({:?} tokens)",
            response.content.len(),
            response.tokens_used
        );
        info!("✅ Successfully generated translation");

        Ok(chunk_words(&response.content, self.words_per_segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[SubtitleSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_chunk_seven_words() {
        let segments = chunk_words("one two three four five six seven", 5);
        assert_eq!(texts(&segments), vec!["one two three four five", "six seven"]);
    }

    #[test]
    fn test_chunk_empty_and_blank_text() {
        assert!(chunk_words("", 5).is_empty());
        assert!(chunk_words("  \n\t  ", 5).is_empty());
    }

    #[test]
    fn test_chunk_normalises_whitespace() {
        let segments = chunk_words("  hola\n\ta   todos  y bienvenidos\r\n al video ", 5);
        assert_eq!(texts(&segments), vec!["hola a todos y bienvenidos", "al video"]);
    }

    #[test]
    fn test_chunk_exact_multiple() {
        let segments = chunk_words("a b c d e f g h i j", 5);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.text.split(' ').count() == 5));
    }

    #[test]
    fn test_chunk_is_deterministic() {
        let text = PLACEHOLDER_TRANSCRIPT;
        assert_eq!(chunk_words(text, 5), chunk_words(text, 5));
    }

    #[test]
    fn test_chunk_preserves_word_order() {
        let segments = chunk_words(PLACEHOLDER_TRANSCRIPT, 5);
        let rejoined = texts(&segments).join(" ");
        let original: Vec<&str> = PLACEHOLDER_TRANSCRIPT.split_whitespace().collect();
        assert_eq!(rejoined, original.join(" "));

        let (last, rest) = segments.split_last().unwrap();
        assert!(rest.iter().all(|s| s.text.split(' ').count() == 5));
        assert!((1..=5).contains(&last.text.split(' ').count()));
    }

    #[test]
    fn test_chunk_zero_size_falls_back_to_single_words() {
        let segments = chunk_words("a b", 0);
        assert_eq!(texts(&segments), vec!["a", "b"]);
    }

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_translation_prompt("Spanish", "Intro to Rust", PLACEHOLDER_TRANSCRIPT);
        assert!(prompt.contains("into Spanish."));
        assert!(prompt.contains("titled \"Intro to Rust\""));
        assert!(prompt.contains(PLACEHOLDER_TRANSCRIPT));
    }

    #[test]
    fn test_validate_request() {
        let request = SubtitleRequest::new("https://youtu.be/dQw4w9WgXcQ", "French");
        assert_eq!(
            request.validate().unwrap(),
            ("https://youtu.be/dQw4w9WgXcQ", "French")
        );

        let missing_language = SubtitleRequest {
            url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            language: None,
        };
        assert!(matches!(
            missing_language.validate(),
            Err(SubtitleError::Validation(field)) if field == "language"
        ));

        let empty_url = SubtitleRequest::new("", "French");
        assert!(matches!(
            empty_url.validate(),
            Err(SubtitleError::Validation(field)) if field == "url"
        ));

        assert!(SubtitleRequest::default().validate().is_err());
    }

    #[test]
    fn test_request_deserializes_with_missing_fields() {
        let request: SubtitleRequest = serde_json::from_str(r#"{"url": "x"}"#).unwrap();
        assert_eq!(request.url.as_deref(), Some("x"));
        assert!(request.language.is_none());
    }
}
