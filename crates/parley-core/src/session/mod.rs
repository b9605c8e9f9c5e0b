//! Session - per-user conversation state
//!
//! - Store: durable JSON session files named by a hash of the user id
//! - Cache: resident sessions with per-user locks and idle eviction

mod cache;
mod store;

pub use cache::{spawn_sweeper, SessionCache, UserSession, DEFAULT_SESSION_EXPIRY};
pub use store::{
    session_file_name, truncate_messages, FileSessionStore, SessionFile, SessionStore,
    DEFAULT_MAX_MESSAGES, SESSIONS_DIR,
};
