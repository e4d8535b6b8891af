use super::{build_http_client, LLMConfig, LLMError, LLMProvider, LLMResponse, Result, LLM};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GEMINI_DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Gemini provider implementation
pub struct GeminiProvider {
    config: LLMConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LLMError::Configuration("Gemini API key required".to_string()))?;

        let client = build_http_client(&config)?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn url(&self) -> String {
        let base = self
            .config
            .endpoint
            .as_deref()
            .unwrap_or(GEMINI_DEFAULT_ENDPOINT)
            .trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.config.model)
    }

    fn request_for(&self, prompt: &str) -> GeminiRequest {
        let generation_config =
            if self.config.max_tokens.is_some() || self.config.temperature.is_some() {
                Some(GeminiGenerationConfig {
                    max_output_tokens: self.config.max_tokens,
                    temperature: self.config.temperature,
                })
            } else {
                None
            };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

/// Join the text parts of the first candidate
fn extract_gemini_text(response: GeminiResponse) -> Result<LLMResponse> {
    let tokens_used = response.usage_metadata.and_then(|u| u.total_token_count);

    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LLMError::ResponseError(format!("No response from Gemini: {}", reason)));
        }
    };

    let content = candidate.content.ok_or_else(|| {
        LLMError::ResponseError(format!(
            "Gemini candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let text = content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    Ok(LLMResponse {
        content: text,
        tokens_used,
    })
}

#[async_trait]
impl LLM for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<LLMResponse> {
        let request = self.request_for(prompt);

        debug!("Sending request to Gemini API (model {})", self.config.model);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::Api {
                provider: LLMProvider::Gemini,
                status,
                body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        extract_gemini_text(gemini_response)
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::Gemini
    }
}

/// OpenAI-compatible chat completions provider.
///
/// A custom endpoint may point at any compatible server, in which case the
/// API key is optional.
pub struct OpenAIProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    total_tokens: u32,
}

impl OpenAIProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let has_key = config.api_key.as_deref().is_some_and(|k| !k.is_empty());
        if config.endpoint.is_none() && !has_key {
            return Err(LLMError::Configuration("OpenAI API key required".to_string()));
        }

        let client = build_http_client(&config)?;

        Ok(Self { config, client })
    }
}

fn extract_openai_text(response: OpenAIResponse) -> Result<LLMResponse> {
    let tokens_used = response.usage.map(|u| u.total_tokens);

    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::ResponseError("No response from OpenAI".to_string()))?
        .message
        .content
        .ok_or_else(|| LLMError::ResponseError("OpenAI message has no content".to_string()))?;

    Ok(LLMResponse {
        content,
        tokens_used,
    })
}

#[async_trait]
impl LLM for OpenAIProvider {
    async fn generate(&self, prompt: &str) -> Result<LLMResponse> {
        let url = self.config.endpoint.as_deref().unwrap_or(OPENAI_DEFAULT_ENDPOINT);

        let request = OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to OpenAI-compatible endpoint {}", url);

        let mut builder = self.client.post(url).json(&request);
        if let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::Api {
                provider: LLMProvider::OpenAI,
                status,
                body,
            });
        }

        let openai_response: OpenAIResponse = response.json().await?;
        extract_openai_text(openai_response)
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}
