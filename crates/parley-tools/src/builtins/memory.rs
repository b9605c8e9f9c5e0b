//! Memory tools: let the model save and recall facts about the user
//!
//! All four tools act on the user carried in the [`ToolContext`]; the model
//! never names a user itself.

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolContext};
use parley_llm::ToolDefinition;
use parley_memory::MemoryStore;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize)]
struct SaveArgs {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct KeyArgs {
    key: String,
}

fn parse<T: serde::de::DeserializeOwned>(input: serde_json::Value) -> Result<T> {
    serde_json::from_value(input).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// `saveMemoryEntry`: store a key/value pair
pub struct SaveMemoryTool {
    definition: ToolDefinition,
    store: Arc<MemoryStore>,
}

impl SaveMemoryTool {
    /// Create the tool over `store`
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let definition = ToolDefinition::new(
            "saveMemoryEntry",
            "Save information to memory. Use this when user wants to remember something.",
            json!({
                "type": "object",
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "A short identifier for what to remember (e.g., 'user_name', 'favorite_language')"
                    },
                    "value": {
                        "type": "string",
                        "description": "The information to remember"
                    }
                },
                "required": ["key", "value"]
            }),
        );
        Self { definition, store }
    }
}

#[async_trait::async_trait]
impl Tool for SaveMemoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<String> {
        let args: SaveArgs = parse(input)?;
        debug!(user_id = %ctx.user_id, key = %args.key, "saveMemoryEntry");
        self.store.set(&ctx.user_id, &args.key, &args.value).await?;
        Ok("Saved".to_string())
    }
}

/// `getMemoryEntry`: look a key up
pub struct GetMemoryTool {
    definition: ToolDefinition,
    store: Arc<MemoryStore>,
}

impl GetMemoryTool {
    /// Create the tool over `store`
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let definition = ToolDefinition::new(
            "getMemoryEntry",
            "Retrieve information from memory.",
            json!({
                "type": "object",
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "The identifier of the information to recall"
                    }
                },
                "required": ["key"]
            }),
        );
        Self { definition, store }
    }
}

#[async_trait::async_trait]
impl Tool for GetMemoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<String> {
        let args: KeyArgs = parse(input)?;
        Ok(self.store.get(&ctx.user_id, &args.key).await?)
    }
}

/// `deleteMemoryEntry`: forget a key
pub struct DeleteMemoryTool {
    definition: ToolDefinition,
    store: Arc<MemoryStore>,
}

impl DeleteMemoryTool {
    /// Create the tool over `store`
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let definition = ToolDefinition::new(
            "deleteMemoryEntry",
            "Delete information from memory.",
            json!({
                "type": "object",
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "The identifier of the information to forget"
                    }
                },
                "required": ["key"]
            }),
        );
        Self { definition, store }
    }
}

#[async_trait::async_trait]
impl Tool for DeleteMemoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<String> {
        let args: KeyArgs = parse(input)?;
        debug!(user_id = %ctx.user_id, key = %args.key, "deleteMemoryEntry");
        self.store.delete(&ctx.user_id, &args.key).await?;
        Ok("Deleted".to_string())
    }
}

/// `listMemoryEntries`: dump every entry as a JSON object
pub struct ListMemoryTool {
    definition: ToolDefinition,
    store: Arc<MemoryStore>,
}

impl ListMemoryTool {
    /// Create the tool over `store`
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let definition = ToolDefinition::new(
            "listMemoryEntries",
            "List all saved information.",
            json!({
                "type": "object",
                "properties": {}
            }),
        );
        Self { definition, store }
    }
}

#[async_trait::async_trait]
impl Tool for ListMemoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<String> {
        let map = self.store.list(&ctx.user_id).await?;
        if map.is_empty() {
            return Ok("{}".to_string());
        }
        serde_json::to_string(&map).map_err(|e| Error::Execution(e.to_string()))
    }
}
