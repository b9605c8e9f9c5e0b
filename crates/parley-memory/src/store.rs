//! Durable key/value memory store
//!
//! Layout: `<data>/memory/<user>.json`, a flat JSON object of string to
//! string. Every operation reloads the whole file; mutations write the whole
//! mapping back. One store-wide lock serializes all read-modify-write cycles,
//! across users as well as within one user.

use crate::error::{Error, Result};
use crate::fs::{ensure_private_dir, read_optional, write_atomic};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Subdirectory of the data dir holding memory files
pub const MEMORY_DIR: &str = "memory";

/// A user's remembered facts, ordered by key
pub type MemoryMap = BTreeMap<String, String>;

/// File-backed per-user memory store
pub struct MemoryStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl MemoryStore {
    /// Create a store rooted at `<data_dir>/memory`
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(MEMORY_DIR),
            lock: Mutex::new(()),
        }
    }

    /// Directory holding the memory files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a user's memory file
    pub fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }

    /// Remember `value` under `key`, replacing any previous value
    pub async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load(user_id).await?;
        map.insert(key.to_string(), value.to_string());
        self.save(user_id, &map).await?;
        debug!(user_id = %user_id, key = %key, "Memory entry saved");
        Ok(())
    }

    /// Value stored under `key`, or an empty string when absent
    pub async fn get(&self, user_id: &str, key: &str) -> Result<String> {
        let _guard = self.lock.lock().await;
        let map = self.load(user_id).await?;
        Ok(map.get(key).cloned().unwrap_or_default())
    }

    /// Forget `key`. Deleting an absent key still rewrites the file.
    pub async fn delete(&self, user_id: &str, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load(user_id).await?;
        map.remove(key);
        self.save(user_id, &map).await?;
        debug!(user_id = %user_id, key = %key, "Memory entry deleted");
        Ok(())
    }

    /// Every entry for the user
    pub async fn list(&self, user_id: &str) -> Result<MemoryMap> {
        let _guard = self.lock.lock().await;
        self.load(user_id).await
    }

    /// Markdown block for the system context, or an empty string when the
    /// user has nothing remembered.
    pub async fn render(&self, user_id: &str) -> Result<String> {
        let map = self.list(user_id).await?;
        Ok(render_markdown(&map))
    }

    async fn load(&self, user_id: &str) -> Result<MemoryMap> {
        let path = self.path_for(user_id)?;
        match read_optional(&path).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(MemoryMap::new()),
        }
    }

    async fn save(&self, user_id: &str, map: &MemoryMap) -> Result<()> {
        let path = self.path_for(user_id)?;
        ensure_private_dir(&self.dir).await?;
        let data = serde_json::to_vec_pretty(map)?;
        write_atomic(&path, &data).await?;
        Ok(())
    }
}

/// Format remembered facts as a "Learned Information" section
#[must_use]
pub fn render_markdown(map: &MemoryMap) -> String {
    if map.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n---\n## Learned Information\n");
    for (key, value) in map {
        out.push_str("- ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

fn validate_user_id(user_id: &str) -> Result<()> {
    let bad = user_id.is_empty()
        || user_id == "."
        || user_id.contains("..")
        || user_id.contains('/')
        || user_id.contains('\\')
        || user_id.contains('\0');
    if bad {
        return Err(Error::InvalidUser(user_id.to_string()));
    }
    Ok(())
}
