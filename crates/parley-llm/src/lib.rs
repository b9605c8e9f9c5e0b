//! Parley LLM - conversation model and provider abstraction
//!
//! This crate provides the LLM-facing half of Parley:
//! - Message: role/content conversation entries with tool-call metadata
//! - Tools: tool definitions and tool calls for function calling
//! - Provider: the `LlmProvider` trait and a queued mock for tests
//! - OpenAI-compatible: a chat-completions client shared by every catalog provider
//! - Catalog: known providers and `provider/model` selector parsing

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai_compat;
pub mod provider;
pub mod tools;

pub use catalog::{ModelSelector, ProviderSpec, PROVIDERS};
pub use completion::{TokenUsage, ToolCompletionRequest, ToolCompletionResponse};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider};
pub use provider::LlmProvider;
pub use tools::{ToolCall, ToolDefinition};
