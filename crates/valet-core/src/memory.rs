//! MemoryStore trait definition.
//!
//! The conversation log is append-only: the only writes are appends, and
//! read order is append order. Uses native async fn in traits (RPITIT);
//! the JSONL-backed implementation lives in `valet-infra`.

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;
use valet_types::error::MemoryError;
use valet_types::memory::{MemoryEntry, MemoryRole};

/// Append-only conversation memory.
pub trait MemoryStore: Send + Sync {
    /// Append one role-tagged message to the log.
    fn append(
        &self,
        role: MemoryRole,
        content: &str,
        meta: BTreeMap<String, Value>,
    ) -> impl Future<Output = Result<(), MemoryError>> + Send;

    /// The most recent `limit` entries, oldest first.
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<MemoryEntry>, MemoryError>> + Send;

    /// A role-prefixed concatenation of the most recent `limit` entries,
    /// one `role: content` line per entry.
    fn summarize(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<String, MemoryError>> + Send {
        async move {
            let entries = self.recent(limit).await?;
            Ok(entries
                .iter()
                .map(|e| format!("{}: {}", e.role, e.content))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
