//! Payload encodings tried, in order, when saving a conversation turn

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::backend::WritePayload;

/// A completed user/assistant exchange to persist for an owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub user_text: String,
    pub assistant_text: String,
    pub owner_id: String,
}

impl TurnRecord {
    pub fn new(
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            owner_id: owner_id.into(),
        }
    }

    /// Single concatenated text blob
    pub fn blob(&self) -> String {
        format!("User: {}\nAssistant: {}", self.user_text, self.assistant_text)
    }
}

/// Known write shapes of the memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// Blob with `{userId}` options
    Canonical,
    /// Blob with `{user_id}` options
    SnakeCaseOwner,
    /// Two role/content records with `{userId}` options
    TurnList,
    /// `{text, metadata: {userId}}`
    TextField,
    /// `{memory, user_id}`
    MemoryField,
}

impl PayloadEncoding {
    /// Fallback ladder, tried first to last
    pub const LADDER: [PayloadEncoding; 5] = [
        PayloadEncoding::Canonical,
        PayloadEncoding::SnakeCaseOwner,
        PayloadEncoding::TurnList,
        PayloadEncoding::TextField,
        PayloadEncoding::MemoryField,
    ];

    /// 1-based position in the ladder, as reported in outcomes and logs
    pub fn format_index(self) -> usize {
        match self {
            PayloadEncoding::Canonical => 1,
            PayloadEncoding::SnakeCaseOwner => 2,
            PayloadEncoding::TurnList => 3,
            PayloadEncoding::TextField => 4,
            PayloadEncoding::MemoryField => 5,
        }
    }

    /// Build the store payload for a turn in this shape
    pub fn encode(self, record: &TurnRecord) -> WritePayload {
        let owner = record.owner_id.as_str();

        match self {
            PayloadEncoding::Canonical => WritePayload {
                input: json!(record.blob()),
                options: Some(json!({ "userId": owner })),
            },
            PayloadEncoding::SnakeCaseOwner => WritePayload {
                input: json!(record.blob()),
                options: Some(json!({ "user_id": owner })),
            },
            PayloadEncoding::TurnList => WritePayload {
                input: json!([
                    { "role": "user", "content": record.user_text },
                    { "role": "assistant", "content": record.assistant_text },
                ]),
                options: Some(json!({ "userId": owner })),
            },
            PayloadEncoding::TextField => WritePayload {
                input: json!({
                    "text": record.blob(),
                    "metadata": { "userId": owner },
                }),
                options: None,
            },
            PayloadEncoding::MemoryField => WritePayload {
                input: json!({
                    "memory": record.blob(),
                    "user_id": owner,
                }),
                options: None,
            },
        }
    }
}

impl std::fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PayloadEncoding::Canonical => "canonical",
            PayloadEncoding::SnakeCaseOwner => "snake_case_owner",
            PayloadEncoding::TurnList => "turn_list",
            PayloadEncoding::TextField => "text_field",
            PayloadEncoding::MemoryField => "memory_field",
        };
        write!(f, "{} (format {})", name, self.format_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TurnRecord {
        TurnRecord::new("I feel anxious", "Let's breathe.", "Alex")
    }

    #[test]
    fn test_ladder_order_matches_indices() {
        let indices: Vec<usize> = PayloadEncoding::LADDER
            .iter()
            .map(|e| e.format_index())
            .collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_blob() {
        assert_eq!(record().blob(), "User: I feel anxious\nAssistant: Let's breathe.");
    }

    #[test]
    fn test_owner_key_casing() {
        let canonical = PayloadEncoding::Canonical.encode(&record());
        assert_eq!(canonical.options, Some(json!({"userId": "Alex"})));

        let snake = PayloadEncoding::SnakeCaseOwner.encode(&record());
        assert_eq!(snake.input, canonical.input);
        assert_eq!(snake.options, Some(json!({"user_id": "Alex"})));
    }

    #[test]
    fn test_turn_list_shape() {
        let payload = PayloadEncoding::TurnList.encode(&record());
        assert_eq!(
            payload.input,
            json!([
                {"role": "user", "content": "I feel anxious"},
                {"role": "assistant", "content": "Let's breathe."}
            ])
        );
        assert_eq!(payload.options, Some(json!({"userId": "Alex"})));
    }

    #[test]
    fn test_flat_shapes_carry_owner_inline() {
        let text = PayloadEncoding::TextField.encode(&record());
        assert_eq!(text.options, None);
        assert_eq!(text.input["metadata"]["userId"], "Alex");
        assert_eq!(text.input["text"], record().blob());

        let memory = PayloadEncoding::MemoryField.encode(&record());
        assert_eq!(memory.options, None);
        assert_eq!(
            memory.input,
            json!({"memory": record().blob(), "user_id": "Alex"})
        );
    }

    #[test]
    fn test_every_shape_exposes_owner_and_text() {
        for encoding in PayloadEncoding::LADDER {
            let payload = encoding.encode(&record());
            assert_eq!(payload.owner_id(), Some("Alex"), "{encoding}");
            assert!(payload.text().unwrap().contains("I feel anxious"), "{encoding}");
        }
    }
}
