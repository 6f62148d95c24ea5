//! Google Gemini LLM provider implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ConfidantError, Result};
use crate::llm::{
    LLMProvider, LLMRequest, LLMResponse, ModelContent, ModelInfo, ModelRole, TokenUsage,
};

/// Default hosted model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default REST endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider speaking the `generateContent` REST API.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Gemini API key
    /// * `model` - Model name (e.g., "gemini-2.5-flash")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_GEMINI_BASE_URL)
    }

    /// Create with a custom base URL (proxies, regional endpoints, tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables.
    ///
    /// Reads from:
    /// - `GEMINI_API_KEY` - API key (required)
    /// - `GEMINI_MODEL` - Model name (optional, defaults to "gemini-2.5-flash")
    /// - `GEMINI_BASE_URL` - Custom base URL (optional)
    ///
    /// # Errors
    ///
    /// Returns an error if GEMINI_API_KEY is not set.
    pub fn from_env(model: Option<impl Into<String>>) -> Result<Self> {
        Self::from_lookup(model, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_lookup(
        model: Option<impl Into<String>>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfidantError::Configuration(
                    "GEMINI_API_KEY environment variable not set".to_string(),
                )
            })?;

        let model = model
            .map(|m| m.into())
            .or_else(|| lookup("GEMINI_MODEL"))
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let base_url =
            lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

        Ok(Self::with_base_url(api_key, model, base_url))
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
    status: Option<String>,
}

// Gemini names the assistant side "model".
fn convert_contents(contents: &[ModelContent]) -> Vec<GeminiContent> {
    contents
        .iter()
        .map(|c| GeminiContent {
            role: Some(
                match c.role {
                    ModelRole::User => "user",
                    ModelRole::Assistant => "model",
                }
                .to_string(),
            ),
            parts: c
                .parts
                .iter()
                .map(|p| GeminiPart {
                    text: p.text.clone(),
                })
                .collect(),
        })
        .collect()
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        let gemini_request = GeminiRequest {
            contents: convert_contents(&request.contents),
            generation_config,
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                ConfidantError::Transport(format!("Failed to send request to Gemini: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error) = serde_json::from_str::<GeminiError>(&text) {
                return Err(ConfidantError::Transport(format!(
                    "Gemini API error ({}): {}",
                    error.error.status.unwrap_or_else(|| status.to_string()),
                    error.error.message
                )));
            }

            return Err(ConfidantError::Transport(format!(
                "Gemini API error ({}): {}",
                status, text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            ConfidantError::Transport(format!("Failed to parse Gemini response: {}", e))
        })?;

        let content = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| {
                ConfidantError::Transport("Gemini API returned no candidates".to_string())
            })?;

        let usage = gemini_response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(LLMResponse { content, usage })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "gemini".to_string(),
            model_name: self.model.clone(),
        }
    }
}
