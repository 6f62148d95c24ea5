//! In-memory store for testing and temporary sessions
//!
//! Accepts every payload shape that names an owner and keeps records in a
//! HashMap keyed by owner. Nothing survives the process.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::backend::{MemoryStore, WritePayload};
use crate::error::{ConfidantError, Result};

/// In-memory store for testing and lightweight use
pub struct InMemoryStore {
    memories: RwLock<HashMap<String, Vec<serde_json::Value>>>,
    next_id: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            memories: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Total records across owners
    pub fn len(&self) -> usize {
        self.memories
            .read()
            .map(|m| m.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn generate_id(&self) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("mem_{}", id)
    }

    fn poisoned() -> ConfidantError {
        ConfidantError::Persistence("in-memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn add(&self, payload: &WritePayload) -> Result<()> {
        let owner = payload
            .owner_id()
            .ok_or_else(|| ConfidantError::Persistence("payload names no owner".to_string()))?
            .to_string();
        let text = payload
            .text()
            .ok_or_else(|| ConfidantError::Persistence("payload carries no text".to_string()))?;

        let record = serde_json::json!({
            "id": self.generate_id(),
            "memory": text,
            "user_id": owner,
        });

        let mut memories = self.memories.write().map_err(|_| Self::poisoned())?;
        memories.entry(owner).or_default().push(record);
        Ok(())
    }

    async fn get_all(&self, owner_id: &str) -> Result<Vec<serde_json::Value>> {
        let memories = self.memories.read().map_err(|_| Self::poisoned())?;
        Ok(memories.get(owner_id).cloned().unwrap_or_default())
    }
}
