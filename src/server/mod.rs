//! Server module for Parley
//!
//! Contains the main initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `background_tasks`: Session sweeper startup
//! - `init`: Component wiring and the run loop

mod background_tasks;
pub mod config;
mod init;
pub(crate) mod loader;

pub use config::{default_data_dir, AppConfig};
pub use init::run;
pub use loader::load_config;
