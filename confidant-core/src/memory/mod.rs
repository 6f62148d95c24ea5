//! Long-term memory: stores, payload encodings, and the save/recall adapter

pub mod adapter;
pub mod backend;
pub mod encoding;
pub mod entry;
pub mod http;
pub mod inmemory;

use std::sync::Arc;

use crate::config::{MemoryConfig, MemoryMode};
use crate::error::Result;

pub use adapter::{MemoryAdapter, Recall, SaveOutcome};
pub use backend::{MemoryStore, WritePayload};
pub use encoding::{PayloadEncoding, TurnRecord};
pub use entry::MemoryEntry;
pub use http::{HttpMemoryConfig, HttpMemoryStore};
pub use inmemory::InMemoryStore;

/// Build the configured store, or `None` when memory is disabled
pub fn store_from_config(config: &MemoryConfig) -> Result<Option<Arc<dyn MemoryStore>>> {
    if !config.enabled {
        return Ok(None);
    }

    let store: Arc<dyn MemoryStore> = match &config.mode {
        MemoryMode::Http { .. } => {
            let http = HttpMemoryConfig::from_memory_config(config).unwrap_or_default();
            Arc::new(HttpMemoryStore::new(http)?)
        }
        MemoryMode::InMemory => Arc::new(InMemoryStore::new()),
    };

    Ok(Some(store))
}

/// Adapter over the configured store, or `None` when memory is disabled
pub fn adapter_from_config(config: &MemoryConfig) -> Result<Option<MemoryAdapter>> {
    Ok(store_from_config(config)?.map(MemoryAdapter::new))
}
