//! JSONL-backed conversation memory.
//!
//! One JSON object per line, append-only. Reads tolerate malformed lines
//! (a crash mid-append can truncate the last line) by logging and skipping
//! them rather than poisoning the whole log.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use tokio::io::AsyncWriteExt;

use valet_core::memory::MemoryStore;
use valet_types::error::MemoryError;
use valet_types::memory::{MemoryEntry, MemoryRole};

/// Append-only conversation log at `{data_dir}/memory.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonlMemoryStore {
    path: PathBuf,
}

impl JsonlMemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlMemoryStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<MemoryEntry>, MemoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(MemoryError::Io(err)),
        };

        let mut entries = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MemoryEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    tracing::warn!(line = lineno + 1, error = %err, "skipping malformed memory line");
                }
            }
        }
        Ok(entries)
    }
}

impl MemoryStore for JsonlMemoryStore {
    async fn append(
        &self,
        role: MemoryRole,
        content: &str,
        meta: BTreeMap<String, Value>,
    ) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut entry = MemoryEntry::now(role, content);
        entry.meta = meta;
        let mut line = serde_json::to_string(&entry)
            .map_err(|e| MemoryError::Malformed(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.read_all().await?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}
