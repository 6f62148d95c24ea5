//! Language-model call contract and provider implementations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role accepted by the model call.
///
/// The hosted provider has no system channel, so the transcript's persona
/// entry is sent as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelRole {
    User,
    Assistant,
}

/// A single text part of a model content entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One entry of the model input: `{role, parts: [{text}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelContent {
    pub role: ModelRole,
    pub parts: Vec<Part>,
}

impl ModelContent {
    /// Create a single-part entry
    pub fn text(role: ModelRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Request to an LLM provider
#[derive(Debug, Clone)]
pub struct LLMRequest {
    /// Ordered conversation contents
    pub contents: Vec<ModelContent>,

    /// Temperature for generation (0.0-2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<usize>,
}

impl LLMRequest {
    /// Create a request with default generation settings
    pub fn new(contents: Vec<ModelContent>) -> Self {
        Self {
            contents,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Generated content
    pub content: String,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Trait for LLM provider implementations.
///
/// Failures surface as [`ConfidantError::Transport`](crate::error::ConfidantError::Transport);
/// callers on the conversational path convert them into the fallback reply.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a reply for the ordered contents in `request`.
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse>;

    /// Get model information
    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

pub mod factory;
pub mod providers;

pub use factory::LLMProviderFactory;
pub use providers::{GeminiProvider, ScriptedCompanionProvider};
