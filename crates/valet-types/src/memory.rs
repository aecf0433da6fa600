//! Conversation memory types.
//!
//! The memory store is an append-only log of role-tagged messages. Entries
//! are consumed by the engine's caller to build prompts; ordering across
//! calls is the append order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Who authored a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MemoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryRole::User => write!(f, "user"),
            MemoryRole::Assistant => write!(f, "assistant"),
            MemoryRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for MemoryRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MemoryRole::User),
            "assistant" => Ok(MemoryRole::Assistant),
            "system" => Ok(MemoryRole::System),
            other => Err(format!("invalid memory role: '{other}'")),
        }
    }
}

/// One role-tagged message in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// UUIDv7, time-sortable.
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub role: MemoryRole,
    pub content: String,
    /// Free-form metadata (e.g. the workflow report a reply came from).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
}

impl MemoryEntry {
    /// Create an entry stamped with the current time.
    pub fn now(role: MemoryRole, content: impl Into<String>) -> Self {
        MemoryEntry {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            role,
            content: content.into(),
            meta: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_role_roundtrip() {
        for role in [MemoryRole::User, MemoryRole::Assistant, MemoryRole::System] {
            let parsed: MemoryRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("narrator".parse::<MemoryRole>().is_err());
    }

    #[test]
    fn test_memory_entry_jsonl_shape() {
        let entry = MemoryEntry::now(MemoryRole::User, "Hello, Valet!");
        let line = serde_json::to_string(&entry).unwrap();
        assert!(!line.contains('\n'));
        let parsed: MemoryEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.content, "Hello, Valet!");
        assert_eq!(parsed.role, MemoryRole::User);
        // Empty meta is omitted from the line entirely.
        assert!(!line.contains("meta"));
    }
}
