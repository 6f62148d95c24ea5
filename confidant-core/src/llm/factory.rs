//! Factory for creating LLM providers from configuration

use crate::config::{LlmConfig, LlmProviderKind};
use crate::llm::LLMProvider;
use crate::llm::providers::gemini::{DEFAULT_GEMINI_BASE_URL, GeminiProvider};
use crate::llm::providers::scripted::ScriptedCompanionProvider;
use std::sync::Arc;

/// Placeholder shipped in sample env files
const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration.
    ///
    /// A Gemini configuration without a usable API key (config or
    /// `GEMINI_API_KEY`) degrades to [`ScriptedCompanionProvider`].
    pub fn create(config: &LlmConfig) -> Arc<dyn LLMProvider> {
        Self::create_with_lookup(config, |key| std::env::var(key).ok())
    }

    /// Same as [`create`](Self::create) with an explicit env lookup.
    pub fn create_with_lookup(
        config: &LlmConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Arc<dyn LLMProvider> {
        match config.provider {
            LlmProviderKind::Scripted => Arc::new(ScriptedCompanionProvider::new()),
            LlmProviderKind::Gemini => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| lookup("GEMINI_API_KEY"))
                    .filter(|key| !key.trim().is_empty() && key != PLACEHOLDER_API_KEY);

                let Some(api_key) = api_key else {
                    tracing::warn!("No Gemini API key found, using scripted replies");
                    return Arc::new(ScriptedCompanionProvider::new());
                };

                let base_url = config
                    .base_url
                    .clone()
                    .or_else(|| lookup("GEMINI_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

                tracing::debug!(model = %config.model, "Using Gemini provider");
                Arc::new(GeminiProvider::with_base_url(
                    api_key,
                    config.model.clone(),
                    base_url,
                ))
            }
        }
    }
}
