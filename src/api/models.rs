//! API data models

use serde::{Deserialize, Serialize};

use crate::subtitles::SubtitleSegment;

/// Successful subtitle response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubtitleResponse {
    pub subtitles: Vec<SubtitleSegment>,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub provider: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
