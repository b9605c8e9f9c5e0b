//! Registry - Tool registration and dispatch
//!
//! Tools receive the acting user explicitly through [`ToolContext`], so a
//! tool never has to look up who invoked it.

use crate::error::{Error, Result};
use parley_llm::{ToolCall, ToolDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-call context handed to every tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolContext {
    /// Transport identity of the user whose turn triggered the call
    pub user_id: String,
}

impl ToolContext {
    /// Create a context for `user_id`
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with parsed JSON arguments, returning text for the model
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<String>;
}

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        debug!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool definitions in LLM format, sorted by name
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| t.definition().clone())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a tool call requested by the model
    pub async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> Result<String> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| Error::NotFound(call.name.clone()))?;

        let input: serde_json::Value = if call.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&call.arguments)
                .map_err(|e| Error::InvalidInput(format!("arguments are not valid JSON: {e}")))?
        };

        tool.execute(ctx, input).await
    }
}
