//! Decoding of records returned by the memory store

use serde_json::Value;

/// A stored record, classified by the field that carries its text
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryEntry {
    MemoryField(String),
    TextField(String),
    ContentField(String),
    /// No known text field; rendered as its JSON dump
    Unknown(Value),
}

impl MemoryEntry {
    /// Classify a raw record.
    ///
    /// Fields are checked in the order `memory`, `text`, `content`; the first
    /// non-empty string wins.
    pub fn decode(record: Value) -> Self {
        let field = |name: &str| {
            record
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let known = field("memory")
            .map(MemoryEntry::MemoryField)
            .or_else(|| field("text").map(MemoryEntry::TextField))
            .or_else(|| field("content").map(MemoryEntry::ContentField));

        known.unwrap_or(MemoryEntry::Unknown(record))
    }

    /// Text shown to the model for this record
    pub fn render(&self) -> String {
        match self {
            MemoryEntry::MemoryField(text)
            | MemoryEntry::TextField(text)
            | MemoryEntry::ContentField(text) => text.clone(),
            MemoryEntry::Unknown(raw) => raw.to_string(),
        }
    }
}
