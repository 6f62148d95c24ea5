//! # Confidant - a persona-scripted AI companion
//!
//! Confidant keeps an append-only conversation transcript, sends it to a
//! hosted language model each turn, and persists completed turns into an
//! external long-term memory store whose accepted write shape is uncertain.
//! Memories are read back once at session start and woven into the persona.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confidant_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfidantConfig::load(None)?;
//!     let provider = LLMProviderFactory::create(&config.llm);
//!     let memory = adapter_from_config(&config.memory)?;
//!     let persona = resolve_persona(&config.persona)?;
//!
//!     let mut session = ConversationSession::start("Alex", &persona, provider, memory).await;
//!     let reply = session.respond("I feel anxious").await?;
//!     println!("{}", reply.response);
//!     reply.wait_persisted().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Failure policy
//!
//! - Blank input is a [`ConfidantError::Validation`](error::ConfidantError::Validation).
//! - Model failures become [`FALLBACK_REPLY`](persona::FALLBACK_REPLY).
//! - Memory failures are logged and never reach the caller.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod memory;
pub mod persona;
pub mod validation;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        ConfidantConfig, LlmConfig, LlmProviderKind, MemoryConfig, MemoryMode, PersonaConfig,
        ServerConfig,
    };
    pub use crate::conversation::{
        ConversationSession, GenerationSettings, Role, Transcript, Turn, TurnReply,
    };
    pub use crate::error::{ConfidantError, Result};
    pub use crate::llm::{
        GeminiProvider, LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, ModelContent,
        ModelRole, ScriptedCompanionProvider,
    };
    pub use crate::memory::{
        HttpMemoryStore, InMemoryStore, MemoryAdapter, MemoryEntry, MemoryStore, PayloadEncoding,
        Recall, SaveOutcome, WritePayload, adapter_from_config, store_from_config,
    };
    pub use crate::persona::{FALLBACK_REPLY, default_persona, render_memory_context, resolve_persona};
    pub use crate::validation::validate_user_name;
}
