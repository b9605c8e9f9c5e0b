//! Discord - serenity-based transport
//!
//! - Config: bot token and activation prefix
//! - Adapter: gateway lifecycle and the `Transport` implementation
//! - Handler: serenity event handler feeding the router

mod adapter;
mod config;
mod handler;

pub use adapter::DiscordAdapter;
pub use config::DiscordConfig;
pub use handler::DiscordHandler;
