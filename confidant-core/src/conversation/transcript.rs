//! Append-only session transcript

use serde::{Deserialize, Serialize};

use crate::error::{ConfidantError, Result};
use crate::llm::{ModelContent, ModelRole};

/// Speaker of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Role label accepted by the model call.
    ///
    /// The provider has no system channel, so `System` goes out as `User`.
    pub fn to_model_role(self) -> ModelRole {
        match self {
            Role::System | Role::User => ModelRole::User,
            Role::Assistant => ModelRole::Assistant,
        }
    }
}

/// A single transcript entry; immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered, append-only sequence of turns owned by one session.
///
/// Index 0 holds the synthetic system turn (persona plus recalled memories)
/// when present; a system turn never appears anywhere else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Turn>", try_from = "Vec<Turn>")]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Build a one-entry transcript from persona and memory text.
    pub fn initialize(persona_text: &str, memory_text: &str) -> Self {
        Self {
            turns: vec![Turn::new(
                Role::System,
                format!("{}{}", persona_text, memory_text),
            )],
        }
    }

    /// Rebuild a transcript handed back by a stateless client.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a system turn appears after index 0.
    pub fn from_turns(turns: Vec<Turn>) -> Result<Self> {
        if let Some(position) = turns
            .iter()
            .skip(1)
            .position(|t| t.role == Role::System)
        {
            return Err(ConfidantError::Validation(format!(
                "system turn only allowed first, found at index {}",
                position + 1
            )));
        }

        Ok(Self { turns })
    }

    /// Append a user turn and return its index.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the transcript untouched, if
    /// `text` is empty after trimming.
    pub fn append_user(&mut self, text: impl Into<String>) -> Result<usize> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ConfidantError::Validation(
                "message cannot be empty".to_string(),
            ));
        }

        Ok(self.push(Role::User, text))
    }

    /// Append an assistant turn and return its index
    pub fn append_assistant(&mut self, text: impl Into<String>) -> usize {
        self.push(Role::Assistant, text.into())
    }

    fn push(&mut self, role: Role, content: String) -> usize {
        self.turns.push(Turn { role, content });
        self.turns.len() - 1
    }

    /// Convert to the model input shape, preserving length and order
    pub fn to_model_input(&self) -> Vec<ModelContent> {
        self.turns
            .iter()
            .map(|t| ModelContent::text(t.role.to_model_role(), t.content.clone()))
            .collect()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The leading system turn, if any
    pub fn system_turn(&self) -> Option<&Turn> {
        self.turns.first().filter(|t| t.role == Role::System)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

impl From<Transcript> for Vec<Turn> {
    fn from(transcript: Transcript) -> Self {
        transcript.turns
    }
}

impl TryFrom<Vec<Turn>> for Transcript {
    type Error = ConfidantError;

    fn try_from(turns: Vec<Turn>) -> Result<Self> {
        Transcript::from_turns(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_concatenates_memory() {
        let transcript = Transcript::initialize("persona", "\n\nmemories");
        assert_eq!(transcript.len(), 1);

        let system = transcript.system_turn().unwrap();
        assert_eq!(system.role(), Role::System);
        assert_eq!(system.content(), "persona\n\nmemories");
    }

    #[test]
    fn test_initialize_without_memory() {
        let transcript = Transcript::initialize("persona", "");
        assert_eq!(transcript.turns()[0].content(), "persona");
    }

    #[test]
    fn test_append_user_preserves_prior_turns() {
        let mut transcript = Transcript::initialize("persona", "");
        transcript.append_user("first").unwrap();
        transcript.append_assistant("reply");

        for text in ["a", "  padded  ", "I feel anxious", "emoji 🙂"] {
            let before = transcript.clone();
            let index = transcript.append_user(text).unwrap();

            assert_eq!(index, before.len());
            assert_eq!(transcript.len(), before.len() + 1);
            assert_eq!(&transcript.turns()[..before.len()], before.turns());
            assert_eq!(transcript.last().unwrap().content(), text);

            transcript.append_assistant("ok");
        }
    }

    #[test]
    fn test_append_user_rejects_blank() {
        let mut transcript = Transcript::initialize("persona", "");
        for text in ["", " ", "\n\t"] {
            let result = transcript.append_user(text);
            assert!(matches!(result, Err(ConfidantError::Validation(_))));
        }
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_append_assistant_always_succeeds() {
        let mut transcript = Transcript::default();
        assert_eq!(transcript.append_assistant(""), 0);
        assert_eq!(transcript.last().unwrap().role(), Role::Assistant);
    }

    #[test]
    fn test_model_input_remaps_system() {
        let mut transcript = Transcript::initialize("persona", "");
        transcript.append_user("hello").unwrap();
        transcript.append_assistant("hi");

        let input = transcript.to_model_input();
        assert_eq!(input.len(), transcript.len());
        assert_eq!(
            input.iter().map(|c| c.role).collect::<Vec<_>>(),
            vec![ModelRole::User, ModelRole::User, ModelRole::Assistant]
        );
        assert_eq!(input[0].parts[0].text, "persona");
        assert_eq!(input[2].parts[0].text, "hi");
    }

    #[test]
    fn test_model_input_empty_transcript() {
        assert!(Transcript::default().to_model_input().is_empty());
    }

    #[test]
    fn test_from_turns_rejects_late_system_turn() {
        let turns = vec![
            Turn::new(Role::System, "persona"),
            Turn::new(Role::User, "hi"),
            Turn::new(Role::System, "sneaky"),
        ];
        assert!(matches!(
            Transcript::from_turns(turns),
            Err(ConfidantError::Validation(_))
        ));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut transcript = Transcript::initialize("persona", "");
        transcript.append_user("hello").unwrap();

        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "system", "content": "persona"},
                {"role": "user", "content": "hello"}
            ])
        );
    }

    #[test]
    fn test_deserialize_validates_order() {
        let json = r#"[{"role":"user","content":"hi"},{"role":"system","content":"late"}]"#;
        assert!(serde_json::from_str::<Transcript>(json).is_err());

        let json = r#"[{"role":"system","content":"persona"},{"role":"user","content":"hi"}]"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.len(), 2);
    }
}
