//! Conversation Session
//!
//! A session owns one transcript and drives a single turn at a time: append
//! the user text, ask the model, append the reply (or the fallback), then
//! hand the exchange to the memory adapter in the background.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::transcript::Transcript;
use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::{LLMProvider, LLMRequest};
use crate::memory::{MemoryAdapter, Recall, SaveOutcome};
use crate::persona::{FALLBACK_REPLY, render_memory_context};

/// Sampling settings applied to every model call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Reply to one user turn
#[derive(Debug)]
pub struct TurnReply {
    /// Assistant text appended to the transcript
    pub response: String,

    /// `true` when the model failed and the fallback text was used
    pub fallback: bool,

    /// Background save of this exchange, when memory is enabled
    pub persisted: Option<JoinHandle<SaveOutcome>>,
}

impl TurnReply {
    /// Wait for the background save, if any
    pub async fn wait_persisted(self) -> Option<SaveOutcome> {
        let handle = self.persisted?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Memory save task did not complete");
                Some(SaveOutcome::Failed)
            }
        }
    }
}

/// A conversation session for one owner
pub struct ConversationSession {
    id: String,
    owner_id: String,
    transcript: Transcript,
    provider: Arc<dyn LLMProvider>,
    memory: Option<MemoryAdapter>,
    memory_enabled: bool,
    turn_count: usize,
    settings: GenerationSettings,
}

impl ConversationSession {
    /// Start a fresh session.
    ///
    /// Memories for `owner_id` are recalled once and rendered into the system
    /// turn. An unreachable store disables memory for the rest of the session.
    pub async fn start(
        owner_id: impl Into<String>,
        persona_text: &str,
        provider: Arc<dyn LLMProvider>,
        memory: Option<MemoryAdapter>,
    ) -> Self {
        let owner_id = owner_id.into();

        let (memories, memory_enabled) = match &memory {
            Some(adapter) => match adapter.recall(&owner_id).await {
                Recall::Available(texts) => (texts, true),
                Recall::Unavailable => {
                    warn!(owner_id = %owner_id, "Continuing without memory");
                    (Vec::new(), false)
                }
            },
            None => (Vec::new(), false),
        };

        let transcript = Transcript::initialize(persona_text, &render_memory_context(&memories));
        let session = Self::assemble(owner_id, transcript, provider, memory, memory_enabled);

        info!(
            session_id = %session.id,
            owner_id = %session.owner_id,
            memories = memories.len(),
            memory_enabled,
            "Session started"
        );
        session
    }

    /// Continue from an existing transcript without recalling memories
    pub fn resume(
        owner_id: impl Into<String>,
        transcript: Transcript,
        provider: Arc<dyn LLMProvider>,
        memory: Option<MemoryAdapter>,
    ) -> Self {
        let memory_enabled = memory.is_some();
        Self::assemble(owner_id.into(), transcript, provider, memory, memory_enabled)
    }

    fn assemble(
        owner_id: String,
        transcript: Transcript,
        provider: Arc<dyn LLMProvider>,
        memory: Option<MemoryAdapter>,
        memory_enabled: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            transcript,
            provider,
            memory,
            memory_enabled,
            turn_count: 0,
            settings: GenerationSettings::default(),
        }
    }

    /// Override sampling settings
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run one turn.
    ///
    /// Only blank input is an error, and it leaves the transcript untouched.
    /// Model failures are absorbed into [`FALLBACK_REPLY`].
    pub async fn respond(&mut self, user_text: &str) -> Result<TurnReply> {
        self.transcript.append_user(user_text)?;

        let request = LLMRequest::new(self.transcript.to_model_input())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);

        debug!(
            session_id = %self.id,
            entries = request.contents.len(),
            "Calling model"
        );

        let (response, fallback) = match self.provider.generate_request(&request).await {
            Ok(reply) => (reply.content, false),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Model call failed, using fallback reply");
                (FALLBACK_REPLY.to_string(), true)
            }
        };

        self.transcript.append_assistant(response.clone());
        self.turn_count += 1;

        let persisted = self.spawn_save(user_text, &response);

        Ok(TurnReply {
            response,
            fallback,
            persisted,
        })
    }

    fn spawn_save(&self, user_text: &str, response: &str) -> Option<JoinHandle<SaveOutcome>> {
        if !self.memory_enabled {
            return None;
        }
        let adapter = self.memory.clone()?;
        let user_text = user_text.to_string();
        let response = response.to_string();
        let owner_id = self.owner_id.clone();

        Some(tokio::spawn(async move {
            adapter.save(&user_text, &response, &owner_id).await
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    /// Whether completed turns are being persisted
    pub fn memory_enabled(&self) -> bool {
        self.memory_enabled
    }

    /// Completed user/assistant exchanges
    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn settings(&self) -> GenerationSettings {
        self.settings
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("turns", &self.transcript.len())
            .field("memory_enabled", &self.memory_enabled)
            .field("turn_count", &self.turn_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::error::ConfidantError;
    use crate::llm::{LLMResponse, ModelRole};
    use crate::memory::{InMemoryStore, MemoryStore, WritePayload};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider that echoes and records how many entries it saw
    struct EchoProvider {
        seen: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl EchoProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
            self.seen.lock().unwrap().push(request.contents.len());
            assert!(request.contents.iter().all(|c| matches!(
                c.role,
                ModelRole::User | ModelRole::Assistant
            )));
            if self.fail {
                return Err(ConfidantError::Transport("connection reset".to_string()));
            }
            let last = &request.contents.last().unwrap().parts[0].text;
            Ok(LLMResponse {
                content: format!("echo: {last}"),
                usage: None,
            })
        }
    }

    struct DownStore;

    #[async_trait]
    impl MemoryStore for DownStore {
        async fn add(&self, _payload: &WritePayload) -> Result<()> {
            Err(ConfidantError::Persistence("down".to_string()))
        }

        async fn get_all(&self, _owner_id: &str) -> Result<Vec<serde_json::Value>> {
            Err(ConfidantError::Persistence("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_start_without_memory() {
        let session =
            ConversationSession::start("Alex", "You are kind.", EchoProvider::new(false), None)
                .await;

        assert!(!session.memory_enabled());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().system_turn().unwrap().content(), "You are kind.");
        assert_eq!(session.turn_count(), 0);
    }

    #[tokio::test]
    async fn test_start_renders_recalled_memories() {
        let store = Arc::new(InMemoryStore::new());
        let adapter = MemoryAdapter::new(store);
        adapter.save("I have a dog", "Nice!", "Alex").await;

        let session = ConversationSession::start(
            "Alex",
            "You are kind.",
            EchoProvider::new(false),
            Some(adapter),
        )
        .await;

        let system = session.transcript().system_turn().unwrap().content().to_string();
        assert!(session.memory_enabled());
        assert!(system.starts_with("You are kind.\n\nRELEVANT MEMORIES"));
        assert!(system.contains("- User: I have a dog\nAssistant: Nice!"));
    }

    #[tokio::test]
    async fn test_unreachable_store_disables_memory() {
        let mut session = ConversationSession::start(
            "Alex",
            "persona",
            EchoProvider::new(false),
            Some(MemoryAdapter::new(Arc::new(DownStore))),
        )
        .await;

        assert!(!session.memory_enabled());
        let reply = session.respond("hello").await.unwrap();
        assert!(reply.persisted.is_none());
    }

    #[tokio::test]
    async fn test_respond_appends_both_turns() {
        let provider = EchoProvider::new(false);
        let mut session =
            ConversationSession::start("Alex", "persona", provider.clone(), None).await;

        let reply = session.respond("hello").await.unwrap();
        assert_eq!(reply.response, "echo: hello");
        assert!(!reply.fallback);

        let roles: Vec<Role> = session.transcript().turns().iter().map(|t| t.role()).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(session.turn_count(), 1);

        session.respond("again").await.unwrap();
        assert_eq!(*provider.seen.lock().unwrap(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_blank_input_leaves_transcript() {
        let provider = EchoProvider::new(false);
        let mut session =
            ConversationSession::start("Alex", "persona", provider.clone(), None).await;

        let err = session.respond("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.turn_count(), 0);
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_uses_fallback() {
        let mut session =
            ConversationSession::start("Alex", "persona", EchoProvider::new(true), None).await;

        let reply = session.respond("hello").await.unwrap();
        assert!(reply.fallback);
        assert_eq!(reply.response, FALLBACK_REPLY);
        assert_eq!(session.transcript().last().unwrap().content(), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_save_runs_in_background() {
        let store = Arc::new(InMemoryStore::new());
        let mut session = ConversationSession::start(
            "Alex",
            "persona",
            EchoProvider::new(false),
            Some(MemoryAdapter::new(store.clone())),
        )
        .await;

        let reply = session.respond("hello").await.unwrap();
        assert_eq!(reply.wait_persisted().await, Some(SaveOutcome::Saved(1)));
        assert_eq!(store.get_all("Alex").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resume_keeps_history() {
        let mut transcript = Transcript::initialize("persona", "");
        transcript.append_user("hi").unwrap();
        transcript.append_assistant("hello");

        let mut session =
            ConversationSession::resume("Alex", transcript, EchoProvider::new(false), None)
                .with_settings(GenerationSettings {
                    temperature: 0.2,
                    max_tokens: 64,
                });

        session.respond("how are you").await.unwrap();
        assert_eq!(session.transcript().len(), 5);
        assert_eq!(session.settings().max_tokens, 64);
    }
}
