//! Best-effort persistence of conversation turns with format fallback

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::backend::MemoryStore;
use super::encoding::{PayloadEncoding, TurnRecord};
use super::entry::MemoryEntry;

/// Result of a save: which format stuck, or none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "format", rename_all = "lowercase")]
pub enum SaveOutcome {
    /// Stored using the 1-based format index
    Saved(usize),
    /// Every format was rejected
    Failed,
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }
}

/// Result of reading an owner's memories back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recall {
    /// Store reachable; possibly no memories
    Available(Vec<String>),
    /// Store unreachable or erroring
    Unavailable,
}

impl Recall {
    pub fn is_available(&self) -> bool {
        matches!(self, Recall::Available(_))
    }

    pub fn into_texts(self) -> Vec<String> {
        match self {
            Recall::Available(texts) => texts,
            Recall::Unavailable => Vec::new(),
        }
    }
}

/// Adapter between the conversation and an external memory store.
///
/// Never returns an error: write failures walk the
/// [`PayloadEncoding::LADDER`] and read failures degrade to an empty recall.
#[derive(Clone)]
pub struct MemoryAdapter {
    store: Arc<dyn MemoryStore>,
}

impl MemoryAdapter {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }

    /// Persist a user/assistant exchange for `owner_id`.
    pub async fn save(
        &self,
        user_text: &str,
        assistant_text: &str,
        owner_id: &str,
    ) -> SaveOutcome {
        let record = TurnRecord::new(user_text, assistant_text, owner_id);

        for encoding in PayloadEncoding::LADDER {
            if self.attempt_write(encoding, &record).await {
                info!(owner_id, format = encoding.format_index(), "Memory saved");
                return SaveOutcome::Saved(encoding.format_index());
            }
        }

        warn!(owner_id, "All memory save attempts failed");
        SaveOutcome::Failed
    }

    /// Try a single encoding; `true` when the store accepted it
    pub async fn attempt_write(&self, encoding: PayloadEncoding, record: &TurnRecord) -> bool {
        let payload = encoding.encode(record);

        match self.store.add(&payload).await {
            Ok(()) => true,
            Err(e) => {
                debug!(
                    owner_id = %record.owner_id,
                    format = encoding.format_index(),
                    error = %e,
                    "Memory format rejected"
                );
                false
            }
        }
    }

    /// Read every memory for `owner_id`, distinguishing an unreachable store
    pub async fn recall(&self, owner_id: &str) -> Recall {
        match self.store.get_all(owner_id).await {
            Ok(records) => {
                let texts: Vec<String> = records
                    .into_iter()
                    .map(|r| MemoryEntry::decode(r).render())
                    .collect();
                info!(owner_id, count = texts.len(), "Loaded memories");
                Recall::Available(texts)
            }
            Err(e) => {
                warn!(owner_id, error = %e, "Memory service unavailable");
                Recall::Unavailable
            }
        }
    }

    /// Rendered memories for `owner_id`; empty if none or unreachable
    pub async fn load_all(&self, owner_id: &str) -> Vec<String> {
        self.recall(owner_id).await.into_texts()
    }
}

impl std::fmt::Debug for MemoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAdapter").finish_non_exhaustive()
    }
}
