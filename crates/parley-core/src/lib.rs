//! Parley Core - sessions, engine and routing
//!
//! This crate provides the stateful heart of Parley:
//! - Session: per-user conversation persistence, the session cache and its sweeper
//! - Engine: the `Engine` trait and the tool-calling `AgentEngine`
//! - Router: trigger detection, turn processing and reply splitting
//! - Identity: system prompt loading
//! - Shutdown: cancellation shared by background tasks

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod identity;
pub mod router;
pub mod session;
pub mod shutdown;

pub use engine::{AgentEngine, ChatOptions, ChatOutcome, Engine};
pub use error::{Error, Result};
pub use identity::{load_identity, IDENTITY_FILE};
pub use router::{
    detect_trigger, split_message, ChannelKind, InboundEvent, MessageRouter, Outcome,
    RouterConfig, Transport,
};
pub use session::{
    spawn_sweeper, truncate_messages, FileSessionStore, SessionCache, SessionStore, UserSession,
};
pub use shutdown::{wait_for_shutdown_signal, ShutdownController};
