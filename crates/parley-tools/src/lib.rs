//! Parley Tools - tool registry
//!
//! This crate provides the tool system the engine calls into:
//! - Registry: tool registration, lookup and dispatch
//! - Builtins: memory tools backed by `parley-memory`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod registry;

pub use builtins::register_memory_tools;
pub use error::{Error, Result};
pub use registry::{Tool, ToolContext, ToolRegistry};
