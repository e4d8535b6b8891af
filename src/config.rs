use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::llm::{LLMConfig, LLMProvider};
use crate::subtitles::DEFAULT_WORDS_PER_SEGMENT;

/// Locations searched for a configuration file, in order
const CONFIG_PATHS: [&str; 3] = [
    "subtitle-service.toml",
    "config/subtitle-service.toml",
    "/etc/subtitle-service/config.toml",
];

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Configuration for the subtitle service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Text-generation model settings
    pub llm: LLMConfig,

    /// Video metadata lookup settings
    pub metadata: MetadataConfig,

    /// Subtitle segmentation settings
    pub subtitles: SubtitleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Directory holding the front-end files
    pub static_dir: PathBuf,

    /// Entry file served for `/`
    pub index_file: String,

    /// Allow cross-origin browser requests (front-end served elsewhere)
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Base URL of the video platform
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// InnerTube web client version
    pub client_version: String,

    /// Request timeout in seconds; no timeout when unset
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    /// Number of words grouped into one subtitle segment
    pub words_per_segment: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: PathBuf::from("client"),
            index_file: "index.html".to_string(),
            enable_cors: false,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            user_agent: USER_AGENT.to_string(),
            client_version: "2.20241126.01.00".to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            words_per_segment: DEFAULT_WORDS_PER_SEGMENT,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, or defaults
    pub fn load() -> Result<Self> {
        for path in &CONFIG_PATHS {
            let path = Path::new(path);
            if path.exists() {
                return Self::load_from(path);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Override settings from process environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("GEMINI_API_KEY") {
            self.llm.api_key = Some(api_key);
        }

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }

        if let Some(model) = lookup("SUBTITLE_SERVICE_MODEL") {
            self.llm.model = model;
        }

        if let Some(dir) = lookup("SUBTITLE_SERVICE_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
    }

    /// Apply command-line values, which take precedence over file and environment
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, static_dir: Option<PathBuf>) {
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(dir) = static_dir {
            self.server.static_dir = dir;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }

        if self.subtitles.words_per_segment == 0 {
            return Err(anyhow!("words_per_segment must be greater than 0"));
        }

        if self.llm.model.trim().is_empty() {
            return Err(anyhow!("model name must not be empty"));
        }

        let has_key = self.llm.api_key.as_deref().is_some_and(|k| !k.is_empty());
        match self.llm.provider {
            LLMProvider::Gemini if !has_key => {
                return Err(anyhow!("GEMINI_API_KEY is required for the Gemini provider"));
            }
            LLMProvider::OpenAI if !has_key && self.llm.endpoint.is_none() => {
                return Err(anyhow!(
                    "API key required for the OpenAI provider without a custom endpoint"
                ));
            }
            _ => {}
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Path of the static entry file
    pub fn index_path(&self) -> PathBuf {
        self.server.static_dir.join(&self.server.index_file)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Subtitle Service Configuration:\n\
            - Listen: {}\n\
            - Static Directory: {}\n\
            - Model Provider: {:?}\n\
            - Model: {}\n\
            - Words per Segment: {}",
            self.bind_address(),
            self.server.static_dir.display(),
            self.llm.provider,
            self.llm.model,
            self.subtitles.words_per_segment
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_static_dir(mut self, dir: PathBuf) -> Self {
        self.config.server.static_dir = dir;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn with_words_per_segment(mut self, words: usize) -> Self {
        self.config.subtitles.words_per_segment = words;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
