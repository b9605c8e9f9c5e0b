//! Engine - the conversational capability the router drives
//!
//! [`AgentEngine`] runs the model/tool loop: ask the provider for a
//! completion, execute any requested tools on behalf of the acting user,
//! feed the results back, and stop at the first plain reply.

use crate::error::{Error, Result};
use parley_llm::{LlmProvider, Message, TokenUsage, ToolCompletionRequest};
use parley_tools::{ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default cap on model round-trips per turn
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Per-call generation options
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Maximum tokens to generate per completion
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// Result of a successful turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    /// Final assistant text (may be empty)
    pub reply: String,
    /// The full conversation after the turn, including tool traffic
    pub messages: Vec<Message>,
    /// Tokens spent across every round-trip of the turn
    pub usage: TokenUsage,
}

/// Conversational engine
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Engine: Send + Sync {
    /// Run one turn for `user_id` over `messages`
    async fn chat(
        &self,
        user_id: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<ChatOutcome>;
}

/// Tool-calling engine over an LLM provider
pub struct AgentEngine {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    model: String,
    max_iterations: usize,
}

impl AgentEngine {
    /// Create an engine. An empty `system_prompt` adds no system message.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            system_prompt: system_prompt.into(),
            model: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Use `model` instead of the provider default
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the round-trip cap
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    fn model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }
}

#[async_trait::async_trait]
impl Engine for AgentEngine {
    #[instrument(skip(self, messages, options), fields(provider = %self.provider.name()))]
    async fn chat(
        &self,
        user_id: &str,
        mut messages: Vec<Message>,
        options: &ChatOptions,
    ) -> Result<ChatOutcome> {
        let starts_with_system = messages.first().is_some_and(Message::is_system);
        if !starts_with_system && !self.system_prompt.is_empty() {
            messages.insert(0, Message::system(self.system_prompt.clone()));
        }

        let ctx = ToolContext::new(user_id);
        let definitions = self.tools.definitions();
        let mut usage = TokenUsage::default();

        for iteration in 1..=self.max_iterations {
            let mut request =
                ToolCompletionRequest::new(self.model(), messages.clone(), definitions.clone());
            request.max_tokens = options.max_tokens;
            request.temperature = options.temperature;

            let response = self.provider.complete_with_tools(request).await?;
            if let Some(reported) = &response.usage {
                usage.accumulate(reported);
            }

            if response.tool_calls.is_empty() {
                let reply = response.content.unwrap_or_default();
                messages.push(Message::assistant(reply.clone()));
                debug!(
                    iteration,
                    total_tokens = usage.total_tokens,
                    "Engine produced reply"
                );
                return Ok(ChatOutcome {
                    reply,
                    messages,
                    usage,
                });
            }

            let calls = response.tool_calls;
            messages.push(Message::assistant_with_tool_calls(
                response.content.unwrap_or_default(),
                calls.clone(),
            ));

            for call in &calls {
                info!(tool = %call.name, iteration, "Executing tool");
                let output = match self.tools.execute(&ctx, call).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool failed");
                        format!("error: {e}")
                    }
                };
                messages.push(Message::tool_response(&call.id, &call.name, output));
            }
        }

        Err(Error::Engine(format!(
            "no reply after {} tool iterations",
            self.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_llm::{MessageRole, MockProvider, ToolCall, ToolCompletionResponse};
    use parley_memory::MemoryStore;
    use parley_tools::register_memory_tools;
    use tempfile::TempDir;

    fn engine_with(provider: MockProvider, prompt: &str) -> (TempDir, Arc<MemoryStore>, AgentEngine) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new(dir.path()));
        let mut registry = ToolRegistry::new();
        register_memory_tools(&mut registry, store.clone());
        let engine = AgentEngine::new(Arc::new(provider), Arc::new(registry), prompt);
        (dir, store, engine)
    }

    fn save_call(key: &str, value: &str) -> ToolCall {
        ToolCall {
            id: "call_save".to_string(),
            name: "saveMemoryEntry".to_string(),
            arguments: serde_json::json!({"key": key, "value": value}).to_string(),
        }
    }

    #[tokio::test]
    async fn test_plain_reply() {
        let provider = MockProvider::new();
        provider.add_tool_response(ToolCompletionResponse::text("hi there"));
        let (_dir, _store, engine) = engine_with(provider.clone(), "You are Parley.");

        let out = engine
            .chat("42", vec![Message::user("hello")], &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(out.reply, "hi there");
        assert_eq!(
            out.messages,
            vec![
                Message::system("You are Parley."),
                Message::user("hello"),
                Message::assistant("hi there"),
            ]
        );
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 4);
    }

    #[tokio::test]
    async fn test_existing_system_message_kept() {
        let provider = MockProvider::new();
        let (_dir, _store, engine) = engine_with(provider.clone(), "identity");

        let out = engine
            .chat(
                "42",
                vec![Message::system("identity + memory"), Message::user("hello")],
                &ChatOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(out.messages[0], Message::system("identity + memory"));
        assert_eq!(out.messages.iter().filter(|m| m.is_system()).count(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_adds_no_system() {
        let provider = MockProvider::new();
        let (_dir, _store, engine) = engine_with(provider, "");

        let out = engine
            .chat("42", vec![Message::user("hello")], &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(out.messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_tool_loop_acts_for_user() {
        let provider = MockProvider::new();
        provider.add_tool_response(ToolCompletionResponse::tool_calls(vec![save_call(
            "favorite_color",
            "blue",
        )]));
        provider.add_tool_response(ToolCompletionResponse::text("Noted!"));
        let (_dir, store, engine) = engine_with(provider.clone(), "");

        let out = engine
            .chat("42", vec![Message::user("remember blue")], &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(out.reply, "Noted!");
        assert_eq!(store.get("42", "favorite_color").await.unwrap(), "blue");

        let roles: Vec<MessageRole> = out.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Tool,
                MessageRole::Assistant
            ]
        );
        assert_eq!(out.messages[2].content, "Saved");
        assert_eq!(out.messages[2].tool_call_id.as_deref(), Some("call_save"));

        // The second request carries the tool result back to the model
        let second = &provider.requests()[1];
        assert_eq!(second.messages.last().unwrap().role, MessageRole::Tool);
    }

    #[tokio::test]
    async fn test_usage_summed_across_round_trips() {
        let provider = MockProvider::new();
        provider.add_tool_response(
            ToolCompletionResponse::tool_calls(vec![save_call("pet", "cat")]).with_usage(
                TokenUsage {
                    prompt_tokens: 30,
                    completion_tokens: 6,
                    total_tokens: 36,
                },
            ),
        );
        provider.add_tool_response(ToolCompletionResponse::text("Got it").with_usage(TokenUsage {
            prompt_tokens: 50,
            completion_tokens: 4,
            total_tokens: 54,
        }));
        let (_dir, _store, engine) = engine_with(provider, "");

        let out = engine
            .chat("42", vec![Message::user("I have a cat")], &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(out.usage.prompt_tokens, 80);
        assert_eq!(out.usage.completion_tokens, 10);
        assert_eq!(out.usage.total_tokens, 90);
    }

    #[tokio::test]
    async fn test_unreported_usage_stays_zero() {
        let provider = MockProvider::new();
        let (_dir, _store, engine) = engine_with(provider, "");

        let out = engine
            .chat("42", vec![Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap();
        assert_eq!(out.usage, TokenUsage::default());
    }

    #[tokio::test]
    async fn test_tool_error_becomes_result() {
        let provider = MockProvider::new();
        provider.add_tool_response(ToolCompletionResponse::tool_calls(vec![ToolCall {
            id: "c1".to_string(),
            name: "launchRocket".to_string(),
            arguments: "{}".to_string(),
        }]));
        provider.add_tool_response(ToolCompletionResponse::text("sorry"));
        let (_dir, _store, engine) = engine_with(provider, "");

        let out = engine
            .chat("42", vec![Message::user("go")], &ChatOptions::default())
            .await
            .unwrap();
        assert!(out.messages[2].content.starts_with("error: "));
        assert_eq!(out.reply, "sorry");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = MockProvider::new();
        provider.add_error("upstream down");
        let (_dir, _store, engine) = engine_with(provider, "");

        let err = engine
            .chat("42", vec![Message::user("hi")], &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(parley_llm::Error::Api(_))));
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let provider = MockProvider::new();
        for _ in 0..3 {
            provider.add_tool_response(ToolCompletionResponse::tool_calls(vec![save_call(
                "k", "v",
            )]));
        }
        let (_dir, _store, engine) = engine_with(provider.clone(), "");
        let engine = engine.with_max_iterations(2);

        let err = engine
            .chat("42", vec![Message::user("loop")], &ChatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert_eq!(provider.requests().len(), 2);
    }
}
