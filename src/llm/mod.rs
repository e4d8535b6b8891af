pub mod providers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result type for model client operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Error types for model client operations
#[derive(thiserror::Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{provider:?} API error {status}: {body}")]
    Api {
        provider: LLMProvider,
        status: u16,
        body: String,
    },

    #[error("LLM response error: {0}")]
    ResponseError(String),
}

/// LLM provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    Gemini,
    OpenAI,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider to talk to
    pub provider: LLMProvider,

    /// Override for the provider's base endpoint (local or proxy servers)
    pub endpoint: Option<String>,

    /// API key, usually supplied through `GEMINI_API_KEY`
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,

    /// Maximum tokens to generate; provider default when unset
    pub max_tokens: Option<u32>,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Request timeout in seconds; no timeout when unset
    pub timeout_seconds: Option<u64>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Gemini,
            endpoint: None,
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for text-generation providers
#[async_trait]
pub trait LLM: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<LLMResponse>;
    fn provider_type(&self) -> LLMProvider;
}

/// Create the model client handle from configuration.
///
/// The handle is built once at startup and shared for the lifetime of the
/// process; providers never mutate after construction.
pub fn create_llm(config: &LLMConfig) -> Result<Arc<dyn LLM>> {
    match config.provider {
        LLMProvider::Gemini => Ok(Arc::new(providers::GeminiProvider::new(config.clone())?)),
        LLMProvider::OpenAI => Ok(Arc::new(providers::OpenAIProvider::new(config.clone())?)),
    }
}

/// Build the shared HTTP client for a provider
pub(crate) fn build_http_client(config: &LLMConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_seconds {
        builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}
