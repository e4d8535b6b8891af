//! API request handlers

use std::path::{Component, Path};
use tracing::{error, info, warn};

use super::models::{HealthResponse, SubtitleResponse};
use crate::error::SubtitleError;
use crate::subtitles::{SubtitleGenerator, SubtitleRequest};

/// Handle a subtitle generation request, logging the outcome
pub async fn generate_subtitles(
    generator: &SubtitleGenerator,
    request: &SubtitleRequest,
) -> Result<SubtitleResponse, SubtitleError> {
    match generator.generate(request).await {
        Ok(subtitles) => {
            info!("📝 Returning {} subtitle segments", subtitles.len());
            Ok(SubtitleResponse { subtitles })
        }
        Err(e) if e.is_client_error() => {
            warn!("Rejected subtitle request [{}]: {}", e.kind(), e);
            Err(e)
        }
        Err(e) => {
            error!("Server error during subtitle generation [{}]: {}", e.kind(), e);
            Err(e)
        }
    }
}

/// Handle health check requests
pub fn health_check(generator: &SubtitleGenerator) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: format!("{:?}", generator.provider_type()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Read a file below `root`. Returns `None` for missing files and for paths
/// that would escape `root`.
pub async fn read_static_file(root: &Path, relative: &str) -> Option<(Vec<u8>, &'static str)> {
    let relative = Path::new(relative);
    let stays_inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if relative.as_os_str().is_empty() || !stays_inside {
        warn!("Refusing static path {}", relative.display());
        return None;
    }

    let path = root.join(relative);
    match tokio::fs::read(&path).await {
        Ok(content) => Some((content, content_type_for(&path))),
        Err(e) => {
            warn!("Static file {} not served: {}", path.display(), e);
            None
        }
    }
}

/// Content type inferred from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("app.JS")), "application/javascript");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("LICENSE")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_read_static_file() {
        let dir = tempfile::TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("style.css"), "body {}").await.unwrap();

        let (content, content_type) = read_static_file(dir.path(), "style.css").await.unwrap();
        assert_eq!(content, b"body {}");
        assert_eq!(content_type, "text/css; charset=utf-8");

        assert!(read_static_file(dir.path(), "missing.css").await.is_none());
    }

    #[tokio::test]
    async fn test_read_static_file_rejects_traversal() {
        let dir = tempfile::TempDir::new().unwrap();
        let inner = dir.path().join("client");
        tokio::fs::create_dir(&inner).await.unwrap();
        tokio::fs::write(dir.path().join("secret.txt"), "nope").await.unwrap();

        assert!(read_static_file(&inner, "../secret.txt").await.is_none());
        assert!(read_static_file(&inner, "/etc/passwd").await.is_none());
        assert!(read_static_file(&inner, "").await.is_none());
    }
}
