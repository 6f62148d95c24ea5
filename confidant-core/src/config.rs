//! Configuration types for the companion

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::error::{ConfidantError, Result};

/// File name searched in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "confidant.toml";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfidantConfig {
    /// Language-model configuration
    pub llm: LlmConfig,

    /// Long-term memory store configuration
    pub memory: MemoryConfig,

    /// Persona configuration
    pub persona: PersonaConfig,

    /// HTTP server configuration
    pub server: ServerConfig,
}

/// Language-model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type
    pub provider: LlmProviderKind,

    /// Model name
    pub model: String,

    /// API key (prefer the GEMINI_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Temperature for generation (0.0-2.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::Gemini,
            model: crate::llm::providers::gemini::DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Hosted Gemini model
    Gemini,
    /// Offline canned replies
    Scripted,
}

/// Memory store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Disable to run every session in temporary mode
    pub enabled: bool,

    /// Store backend
    pub mode: MemoryMode,

    /// Request timeout for remote stores
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: MemoryMode::Http {
                base_url: "http://localhost:8000".to_string(),
                api_key: None,
            },
            timeout: Duration::from_secs(30),
        }
    }
}

/// Memory backend mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MemoryMode {
    /// mem0-style REST memory service
    Http {
        /// Service URL
        base_url: String,
        /// Optional API key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },

    /// Process-local store, lost on exit
    InMemory,
}

/// Persona configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Display name of the companion
    pub name: String,

    /// File whose contents replace the built-in persona text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<PathBuf>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: crate::persona::DEFAULT_PERSONA_NAME.to_string(),
            prompt_file: None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Allowed CORS origins; empty or `"*"` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl ConfidantConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Loads in this order, later sources winning:
    /// 1. Default configuration
    /// 2. `confidant.toml` in the user config directory
    /// 3. `confidant.toml` in the working directory
    /// 4. The file named by `CONFIDANT_CONFIG_PATH`, or `explicit_path`
    /// 5. `CONFIDANT_`-prefixed environment variables (`__` separates sections)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or the merged
    /// configuration fails validation.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(ConfidantConfig::default()));

        if let Some(dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(dir.join("confidant").join(CONFIG_FILE_NAME)));
        }

        figment = figment.merge(Toml::file(CONFIG_FILE_NAME));

        if let Ok(path) = std::env::var("CONFIDANT_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(ConfidantError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CONFIDANT_").split("__"));

        Self::from_figment(figment)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(ConfidantConfig::default()))
                .merge(Toml::file(path.as_ref())),
        )
    }

    /// Extract and validate from an already-assembled figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: ConfidantConfig = figment.extract().map_err(|e| {
            ConfidantError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfidantError::Configuration(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfidantError::Configuration(
                "llm.max_tokens must be greater than zero".to_string(),
            ));
        }

        if self.persona.name.trim().is_empty() {
            return Err(ConfidantError::Configuration(
                "persona.name must not be empty".to_string(),
            ));
        }

        if let MemoryMode::Http { base_url, .. } = &self.memory.mode {
            if base_url.trim().is_empty() {
                return Err(ConfidantError::Configuration(
                    "memory.mode.base_url must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn figment_with(toml: &str) -> Figment {
        Figment::from(Serialized::defaults(ConfidantConfig::default())).merge(Toml::string(toml))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ConfidantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.provider, LlmProviderKind::Gemini);
        assert!(config.memory.enabled);
        assert_eq!(config.memory.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConfidantConfig::from_figment(figment_with(
            r#"
            [llm]
            provider = "scripted"

            [memory]
            timeout = "5s"
            mode = { type = "inmemory" }
            "#,
        ))
        .unwrap();

        assert_eq!(config.llm.provider, LlmProviderKind::Scripted);
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.memory.mode, MemoryMode::InMemory);
        assert_eq!(config.memory.timeout, Duration::from_secs(5));
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_http_memory_mode() {
        let config = ConfidantConfig::from_figment(figment_with(
            r#"
            [memory.mode]
            type = "http"
            base_url = "http://memory.local:9000"
            api_key = "m-key"
            "#,
        ))
        .unwrap();

        assert_eq!(
            config.memory.mode,
            MemoryMode::Http {
                base_url: "http://memory.local:9000".to_string(),
                api_key: Some("m-key".to_string()),
            }
        );
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let result = ConfidantConfig::from_figment(figment_with("[llm]\ntemperature = 3.5\n"));
        assert!(matches!(result, Err(ConfidantError::Configuration(_))));
    }

    #[test]
    fn test_empty_persona_name_rejected() {
        let result = ConfidantConfig::from_figment(figment_with("[persona]\nname = \"  \"\n"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[persona]\nname = \"Mira\"\n\n[server]\nbind = \"0.0.0.0:8080\"").unwrap();

        let config = ConfidantConfig::from_file(file.path()).unwrap();
        assert_eq!(config.persona.name, "Mira");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_explicit_path() {
        let result = ConfidantConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }
}
