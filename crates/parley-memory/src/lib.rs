//! Parley Memory - durable per-user facts
//!
//! Each user owns one JSON file mapping short keys to values. The engine
//! writes to it through the memory tools; the router reads the rendered
//! form into the system context on every turn.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fs;
pub mod store;

pub use error::{Error, Result};
pub use store::{MemoryMap, MemoryStore, MEMORY_DIR};
