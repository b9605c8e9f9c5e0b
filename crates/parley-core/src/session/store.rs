//! Session persistence
//!
//! Layout: `<data>/sessions/<hex(sha256(user)[..16])>.json` holding
//! `{user_id, updated_at, messages}`. `system` messages are never written.

use crate::error::Result;
use chrono::{DateTime, Utc};
use parley_llm::{Message, MessageRole};
use parley_memory::fs::{ensure_private_dir, read_optional, write_atomic};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory of the data dir holding session files
pub const SESSIONS_DIR: &str = "sessions";

/// Default cap on persisted messages per user
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Durable storage for conversation history
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a user's history. A missing session is an empty history.
    async fn load(&self, user_id: &str) -> Result<Vec<Message>>;

    /// Persist a user's history
    async fn save(&self, user_id: &str, messages: &[Message]) -> Result<()>;
}

/// On-disk session document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    /// Transport identity of the owner
    pub user_id: String,
    /// Last write time
    pub updated_at: DateTime<Utc>,
    /// Conversation history, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// File name of a user's session: first 16 bytes of SHA-256, hex encoded
#[must_use]
pub fn session_file_name(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    format!("{}.json", hex::encode(&digest[..16]))
}

/// Cap `messages` at `max`, oldest first out.
///
/// When a cut happens, leading entries are dropped until the sequence starts
/// with a `user` message (or is empty).
#[must_use]
pub fn truncate_messages(messages: Vec<Message>, max: usize) -> Vec<Message> {
    if messages.len() <= max {
        return messages;
    }
    let start = messages.len() - max;
    messages
        .into_iter()
        .skip(start)
        .skip_while(|m| m.role != MessageRole::User)
        .collect()
}

/// JSON-file session store
pub struct FileSessionStore {
    dir: PathBuf,
    max_messages: usize,
}

impl FileSessionStore {
    /// Create a store rooted at `<data_dir>/sessions`
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(SESSIONS_DIR),
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }

    /// Override the persisted message cap
    #[must_use]
    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    /// Path of a user's session file
    #[must_use]
    pub fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(session_file_name(user_id))
    }
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, user_id: &str) -> Result<Vec<Message>> {
        match read_optional(&self.path_for(user_id)).await? {
            Some(bytes) => {
                let file: SessionFile = serde_json::from_slice(&bytes)?;
                Ok(file.messages)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, user_id: &str, messages: &[Message]) -> Result<()> {
        let kept: Vec<Message> = messages.iter().filter(|m| !m.is_system()).cloned().collect();
        let kept = truncate_messages(kept, self.max_messages);
        if kept.is_empty() {
            debug!(user_id = %user_id, "Nothing to persist, skipping session write");
            return Ok(());
        }

        let file = SessionFile {
            user_id: user_id.to_string(),
            updated_at: Utc::now(),
            messages: kept,
        };
        let data = serde_json::to_vec_pretty(&file)?;

        ensure_private_dir(&self.dir).await?;
        write_atomic(&self.path_for(user_id), &data).await?;
        debug!(user_id = %user_id, count = file.messages.len(), "Session saved");
        Ok(())
    }
}
