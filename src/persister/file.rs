//! JSON-lines file persister
//!
//! Appends one `StoredRecord` per line. Writes are serialized through a
//! mutex so concurrent store calls never interleave partial lines.

use super::{Persister, StoredRecord};
use crate::error::StoreResult;
use crate::types::Event;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File-backed persister
pub struct FilePersister {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePersister {
    /// Create a persister appending to `path`
    ///
    /// The file and its parent directories are created on first store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Persister for FilePersister {
    async fn store(&self, event: &Event) -> StoreResult<()> {
        let mut line = serde_json::to_vec(&StoredRecord::now(event))?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        tracing::debug!(
            event_id = %event.event_id,
            path = %self.path.display(),
            "Event appended"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
