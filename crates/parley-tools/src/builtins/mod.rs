//! Builtins - tools registered at startup
//!
//! - Memory tools: saveMemoryEntry, getMemoryEntry, deleteMemoryEntry, listMemoryEntries

mod memory;

pub use memory::{DeleteMemoryTool, GetMemoryTool, ListMemoryTool, SaveMemoryTool};

use crate::registry::ToolRegistry;
use parley_memory::MemoryStore;
use std::sync::Arc;

/// Register the four memory tools against a shared store
pub fn register_memory_tools(registry: &mut ToolRegistry, store: Arc<MemoryStore>) {
    registry.register(Arc::new(SaveMemoryTool::new(store.clone())));
    registry.register(Arc::new(GetMemoryTool::new(store.clone())));
    registry.register(Arc::new(DeleteMemoryTool::new(store.clone())));
    registry.register(Arc::new(ListMemoryTool::new(store)));
}
