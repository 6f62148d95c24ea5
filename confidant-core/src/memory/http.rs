//! HTTP client for a memory bridge service
//!
//! The bridge forwards each write verbatim to a mem0 client's
//! `memory.add(input, options)` call, which is why every payload shape of the
//! fallback ladder travels in the same envelope:
//!
//! - `POST {base_url}/memories` with body `{"input": ..., "options": ...}`
//! - `GET {base_url}/memories?user_id=<owner>`, answered with a bare array or
//!   `{"results": [...]}`
//!
//! mem0's own REST server (`{messages, user_id}` bodies) is not spoken
//! directly; it sits behind the bridge.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::backend::{MemoryStore, WritePayload};
use crate::config::{MemoryConfig, MemoryMode};
use crate::error::{ConfidantError, Result};

/// Configuration for HTTP memory connections.
#[derive(Debug, Clone)]
pub struct HttpMemoryConfig {
    /// Base URL of the memory service (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Optional API key for authentication
    pub api_key: Option<String>,

    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
}

impl Default for HttpMemoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpMemoryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract from the memory section; `None` unless mode is `http`
    pub fn from_memory_config(config: &MemoryConfig) -> Option<Self> {
        match &config.mode {
            MemoryMode::Http { base_url, api_key } => Some(Self {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                timeout: config.timeout,
            }),
            MemoryMode::InMemory => None,
        }
    }
}

/// HTTP memory store.
pub struct HttpMemoryStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMemoryStore {
    /// Create a store; no request is made until first use
    pub fn new(config: HttpMemoryConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build().map_err(|e| {
            ConfidantError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Add authorization header if API key is configured
    fn add_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(api_key) = &self.api_key {
            request.header("Authorization", format!("Bearer {}", api_key))
        } else {
            request
        }
    }

    /// Accept both a bare array and a `{"results": [...]}` envelope
    fn parse_records(body: serde_json::Value) -> Result<Vec<serde_json::Value>> {
        match body {
            serde_json::Value::Array(records) => Ok(records),
            serde_json::Value::Object(mut map) => match map.remove("results") {
                Some(serde_json::Value::Array(records)) => Ok(records),
                _ => Err(ConfidantError::Persistence(
                    "Unexpected memory listing shape".to_string(),
                )),
            },
            _ => Err(ConfidantError::Persistence(
                "Unexpected memory listing shape".to_string(),
            )),
        }
    }
}

#[async_trait]
impl MemoryStore for HttpMemoryStore {
    async fn add(&self, payload: &WritePayload) -> Result<()> {
        let url = format!("{}/memories", self.base_url);

        let request = self.add_auth(self.client.post(&url).json(payload));

        let response = request
            .send()
            .await
            .map_err(|e| ConfidantError::Persistence(format!("Failed to store memory: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConfidantError::Persistence(format!(
                "Store memory failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }

    async fn get_all(&self, owner_id: &str) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/memories", self.base_url);

        let request = self.add_auth(self.client.get(&url).query(&[("user_id", owner_id)]));

        let response = request
            .send()
            .await
            .map_err(|e| ConfidantError::Persistence(format!("Failed to list memories: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConfidantError::Persistence(format!(
                "List memories failed with status {}: {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ConfidantError::Persistence(format!("Failed to parse response: {}", e)))?;

        Self::parse_records(body)
    }
}
