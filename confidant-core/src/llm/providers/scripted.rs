//! Offline companion provider with canned in-persona replies
//!
//! Used when no API key is configured so the CLI and server stay usable
//! without network access.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{ConfidantError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, ModelInfo, ModelRole};

const STRESS_REPLY: &str = "My friend, I can sense the weight you're carrying. Stress feels like a storm that will never clear, but every storm passes. Let's take one slow breath together. What small step could bring you a little peace right now?";

const SADNESS_REPLY: &str = "Your heart is speaking, and I'm here to listen. Sadness is not weakness; it shows how deeply you care. Our lowest moments often teach us the most about our own strength. What would feel like a gentle comfort right now?";

const PERFORMANCE_REPLY: &str = "Whether it's a stage or a meeting room, the nerves feel the same. Remember that the people watching want you to succeed. Let's turn that nervous energy into preparation. Which part worries you the most?";

const GREETING_REPLY: &str = "Hello, my dear friend! Reaching out for support takes real courage, and I'm glad you're here. How are you feeling in this moment?";

const DEFAULT_REPLIES: [&str; 5] = [
    "I hear you, my friend. Sharing that takes courage. What feels most important for us to explore together right now?",
    "Thank you for trusting me with your thoughts. Every challenge holds the seeds of growth. Tell me more about what you're experiencing.",
    "You are not alone in this. Sometimes the heart needs to speak before the mind finds clarity. I'm listening. What would feel most helpful?",
    "Life has a way of testing us, doesn't it? But you're here and you're speaking, and that is already a victory. Let's take this one gentle step at a time.",
    "Your feelings are valid and your struggles are real. Your strength is remarkable, even when you can't feel it. What do you need most right now?",
];

const RULES: [(&[&str], &str); 4] = [
    (&["stress", "anxious", "worried"], STRESS_REPLY),
    (&["sad", "down", "depressed"], SADNESS_REPLY),
    (&["presentation", "work", "performance"], PERFORMANCE_REPLY),
    (&["hello", "hi", "good"], GREETING_REPLY),
];

/// Keyword-matched canned replies, rotating through a default set.
#[derive(Debug, Default)]
pub struct ScriptedCompanionProvider {
    cursor: AtomicUsize,
}

impl ScriptedCompanionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the reply for a single user message
    pub fn reply_for(&self, message: &str) -> &'static str {
        let lower = message.to_lowercase();

        for (keywords, reply) in RULES {
            if keywords.iter().any(|k| lower.contains(k)) {
                return reply;
            }
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % DEFAULT_REPLIES.len();
        DEFAULT_REPLIES[index]
    }
}

#[async_trait]
impl LLMProvider for ScriptedCompanionProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        // The persona entry also travels as a user role, so only the last
        // entry is the message being answered.
        let last = request
            .contents
            .last()
            .filter(|c| c.role == ModelRole::User)
            .ok_or_else(|| {
                ConfidantError::Transport("No user message to respond to".to_string())
            })?;

        let text = last
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(LLMResponse {
            content: self.reply_for(&text).to_string(),
            usage: None,
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: "canned-replies".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelContent;

    #[test]
    fn test_keyword_rules() {
        let provider = ScriptedCompanionProvider::new();
        assert_eq!(provider.reply_for("I feel anxious"), STRESS_REPLY);
        assert_eq!(provider.reply_for("So DEPRESSED lately"), SADNESS_REPLY);
        assert_eq!(provider.reply_for("big presentation tomorrow"), PERFORMANCE_REPLY);
        assert_eq!(provider.reply_for("Hello there"), GREETING_REPLY);
    }

    #[test]
    fn test_default_replies_rotate() {
        let provider = ScriptedCompanionProvider::new();
        let first = provider.reply_for("xyz");
        let second = provider.reply_for("xyz");
        assert_eq!(first, DEFAULT_REPLIES[0]);
        assert_eq!(second, DEFAULT_REPLIES[1]);
    }

    #[tokio::test]
    async fn test_answers_last_user_entry() {
        let provider = ScriptedCompanionProvider::new();
        let request = LLMRequest::new(vec![
            ModelContent::text(ModelRole::User, "persona text about work"),
            ModelContent::text(ModelRole::User, "I am so sad"),
        ]);

        let response = provider.generate_request(&request).await.unwrap();
        assert_eq!(response.content, SADNESS_REPLY);
    }

    #[tokio::test]
    async fn test_rejects_trailing_assistant_entry() {
        let provider = ScriptedCompanionProvider::new();
        let request = LLMRequest::new(vec![ModelContent::text(ModelRole::Assistant, "hi")]);
        assert!(provider.generate_request(&request).await.is_err());
    }
}
