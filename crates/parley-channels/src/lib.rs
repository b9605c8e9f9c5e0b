//! Parley Channels - chat platform adapters
//!
//! This crate connects Parley's router to a chat platform:
//! - Discord: serenity gateway client implementing `parley_core::Transport`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod discord;
pub mod error;
pub mod util;

pub use discord::{DiscordAdapter, DiscordConfig};
pub use error::{Error, Result};
