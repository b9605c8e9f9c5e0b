//! Session cache
//!
//! Sessions are loaded lazily on first access and evicted after an idle
//! window. The map lock covers lookup, creation (including the initial disk
//! load) and eviction only; turn processing runs under each session's own
//! lock so different users proceed in parallel.

use super::store::SessionStore;
use crate::error::Result;
use parley_llm::Message;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default idle time before a session is evicted
pub const DEFAULT_SESSION_EXPIRY: Duration = Duration::from_secs(30 * 60);

/// A resident conversation, locked for the duration of a turn
#[derive(Debug, Default)]
pub struct UserSession {
    messages: Mutex<Vec<Message>>,
}

impl UserSession {
    fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }

    /// Lock the conversation. Turns for the same user serialize here.
    pub async fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().await
    }
}

struct CacheEntry {
    session: Arc<UserSession>,
    last_used: Instant,
}

/// In-process cache of active sessions
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
    entries: Mutex<HashMap<String, CacheEntry>>,
    expiry: Duration,
}

impl SessionCache {
    /// Create a cache over `store` with the default expiry
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
            expiry: DEFAULT_SESSION_EXPIRY,
        }
    }

    /// Override the idle window
    #[must_use]
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Session for `user_id`, loading it from the store on first access.
    ///
    /// A load failure is logged and the session starts empty. Every call
    /// refreshes the idle timer.
    pub async fn get(&self, user_id: &str) -> Arc<UserSession> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if let Some(entry) = entries.get_mut(user_id) {
            entry.last_used = now;
            return entry.session.clone();
        }

        let messages = match self.store.load(user_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load session, starting empty");
                Vec::new()
            }
        };
        debug!(user_id = %user_id, count = messages.len(), "Session loaded");

        let session = Arc::new(UserSession::with_messages(messages));
        entries.insert(
            user_id.to_string(),
            CacheEntry {
                session: session.clone(),
                last_used: now,
            },
        );
        session
    }

    /// Persist a user's conversation through the backing store
    pub async fn save(&self, user_id: &str, messages: &[Message]) -> Result<()> {
        self.store.save(user_id, messages).await
    }

    /// Evict sessions idle longer than the expiry window. Never saves.
    ///
    /// Returns the number of evicted sessions.
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_used) <= self.expiry);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Whether `user_id` is resident
    pub async fn contains(&self, user_id: &str) -> bool {
        self.entries.lock().await.contains_key(user_id)
    }

    /// Number of resident sessions
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no session is resident
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Run [`SessionCache::sweep`] every `interval` until `token` is cancelled
pub fn spawn_sweeper(
    cache: Arc<SessionCache>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    cache.sweep().await;
                }
                _ = token.cancelled() => {
                    info!("Session sweeper shutting down");
                    break;
                }
            }
        }
    })
}
