use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::MetadataConfig;

static INNERTUBE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("Invalid InnerTube key regex")
});

static LEGACY_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("Invalid legacy key regex")
});

/// Video metadata needed to build a translation prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub duration: Duration,
}

/// Error types for metadata resolution
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("Could not extract a video id from {0:?}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not extract InnerTube API key from watch page")]
    MissingApiKey,

    #[error("Video {video_id} is unavailable ({status}): {reason}")]
    Unavailable {
        video_id: String,
        status: String,
        reason: String,
    },
}

/// Resolves a video URL into its metadata
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<VideoMetadata, MetadataError>;
}

#[derive(Debug, Deserialize)]
struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    #[serde(rename = "videoDetails")]
    video_details: Option<VideoDetails>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
    #[serde(rename = "lengthSeconds")]
    length_seconds: Option<String>,
}

/// YouTube metadata resolver backed by the InnerTube player endpoint
pub struct YouTubeResolver {
    config: MetadataConfig,
    client: reqwest::Client,
}

impl YouTubeResolver {
    pub fn new(config: MetadataConfig) -> Result<Self, MetadataError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            config,
            client: builder.build()?,
        })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn fetch_api_key(&self, video_id: &str) -> Result<String, MetadataError> {
        let watch_url = format!("{}/watch?v={}", self.base_url(), video_id);
        debug!("Fetching watch page: {}", watch_url);

        let page_html = self
            .client
            .get(&watch_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_api_key(&page_html)
    }

    async fn fetch_player(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<PlayerResponse, MetadataError> {
        let player_url = format!(
            "{}/youtubei/v1/player?key={}&prettyPrint=false",
            self.base_url(),
            api_key
        );

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": self.config.client_version
                }
            },
            "videoId": video_id
        });

        let response = self
            .client
            .post(&player_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response)
    }
}

#[async_trait]
impl MetadataResolver for YouTubeResolver {
    async fn resolve(&self, url: &str) -> Result<VideoMetadata, MetadataError> {
        let video_id =
            extract_video_id(url).ok_or_else(|| MetadataError::InvalidUrl(url.to_string()))?;

        let api_key = self.fetch_api_key(&video_id).await?;
        let player = self.fetch_player(&video_id, &api_key).await?;

        metadata_from_player(video_id, player)
    }
}

/// Extract the 11-character video id from the common YouTube URL shapes
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if is_video_id(input) {
        return Some(input.to_string());
    }

    let parsed = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;

    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(host.as_str());
    let host = host.strip_prefix("m.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("live") | Some("v") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn extract_api_key(html: &str) -> Result<String, MetadataError> {
    [&INNERTUBE_KEY_PATTERN, &LEGACY_KEY_PATTERN]
        .iter()
        .find_map(|re| re.captures(html).map(|caps| caps[1].to_string()))
        .ok_or(MetadataError::MissingApiKey)
}

/// Only a playable (`OK`) video with details counts as resolved
fn metadata_from_player(
    video_id: String,
    player: PlayerResponse,
) -> Result<VideoMetadata, MetadataError> {
    let (status, reason) = match player.playability_status {
        Some(p) => (
            p.status.unwrap_or_else(|| "UNKNOWN".to_string()),
            p.reason.unwrap_or_else(|| "no reason given".to_string()),
        ),
        None => ("UNKNOWN".to_string(), "no playability status".to_string()),
    };

    if status != "OK" {
        return Err(MetadataError::Unavailable {
            video_id,
            status,
            reason,
        });
    }

    let (title, length_seconds) = match player.video_details {
        Some(VideoDetails {
            title: Some(title),
            length_seconds,
        }) => (title, length_seconds),
        _ => {
            return Err(MetadataError::Unavailable {
                video_id,
                status,
                reason: "missing video details".to_string(),
            })
        }
    };

    let seconds = length_seconds
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(VideoMetadata {
        video_id,
        title,
        duration: Duration::from_secs(seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url), Some("dQw4w9WgXcQ".to_string()), "{}", url);
        }
    }

    #[test]
    fn test_path_style_urls() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url), Some("dQw4w9WgXcQ".to_string()), "{}", url);
        }
    }

    #[test]
    fn test_invalid_urls() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("not-a-valid-id"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/channel/UC123"), None);
    }

    #[test]
    fn test_extract_api_key() {
        let html = r#"var x = {};"INNERTUBE_API_KEY":"AIzaSyAO_FJ2SlqU8Q4STEH";"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSyAO_FJ2SlqU8Q4STEH");

        let html = r#"innertubeApiKey="AIzaSyB123";"#;
        assert_eq!(extract_api_key(html).unwrap(), "AIzaSyB123");

        assert!(matches!(
            extract_api_key("<html></html>"),
            Err(MetadataError::MissingApiKey)
        ));
    }

    #[test]
    fn test_metadata_from_player() {
        let player: PlayerResponse = serde_json::from_value(serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "videoDetails": { "title": "Full-stack basics", "lengthSeconds": "213" }
        }))
        .unwrap();

        let metadata = metadata_from_player("dQw4w9WgXcQ".to_string(), player).unwrap();
        assert_eq!(metadata.title, "Full-stack basics");
        assert_eq!(metadata.duration, Duration::from_secs(213));
    }

    #[test]
    fn test_metadata_from_error_status_without_details() {
        let player: PlayerResponse = serde_json::from_value(serde_json::json!({
            "playabilityStatus": { "status": "ERROR", "reason": "Video unavailable" }
        }))
        .unwrap();

        let err = metadata_from_player("dQw4w9WgXcQ".to_string(), player).unwrap_err();
        assert!(err.to_string().contains("Video unavailable"));
        assert!(err.to_string().contains("ERROR"));
    }

    #[test]
    fn test_metadata_rejects_unplayable_status_even_with_details() {
        for status in ["ERROR", "LOGIN_REQUIRED", "UNPLAYABLE"] {
            let player: PlayerResponse = serde_json::from_value(serde_json::json!({
                "playabilityStatus": { "status": status, "reason": "Video unavailable" },
                "videoDetails": { "title": "Removed video", "lengthSeconds": "10" }
            }))
            .unwrap();

            let err = metadata_from_player("dQw4w9WgXcQ".to_string(), player).unwrap_err();
            assert!(
                matches!(&err, MetadataError::Unavailable { status: s, .. } if s == status),
                "{}",
                status
            );
        }
    }

    #[test]
    fn test_metadata_requires_playability_status() {
        let player: PlayerResponse = serde_json::from_value(serde_json::json!({
            "videoDetails": { "title": "No status" }
        }))
        .unwrap();

        assert!(metadata_from_player("dQw4w9WgXcQ".to_string(), player).is_err());
    }

    #[test]
    fn test_metadata_ok_without_title_is_unavailable() {
        let player: PlayerResponse = serde_json::from_value(serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "videoDetails": { "lengthSeconds": "10" }
        }))
        .unwrap();

        let err = metadata_from_player("dQw4w9WgXcQ".to_string(), player).unwrap_err();
        assert!(err.to_string().contains("missing video details"));
    }

    #[test]
    fn test_metadata_missing_length_defaults_to_zero() {
        let player: PlayerResponse = serde_json::from_value(serde_json::json!({
            "playabilityStatus": { "status": "OK" },
            "videoDetails": { "title": "Live now" }
        }))
        .unwrap();

        let metadata = metadata_from_player("dQw4w9WgXcQ".to_string(), player).unwrap();
        assert_eq!(metadata.duration, Duration::ZERO);
    }
}
