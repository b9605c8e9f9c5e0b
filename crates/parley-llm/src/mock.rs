//! Mock LLM Provider for testing
//!
//! Returns queued responses in order, then a default text reply.

use crate::completion::{ToolCompletionRequest, ToolCompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A mock LLM provider that returns queued responses or default ones.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<ToolCompletionResponse>>>>,
    requests: Arc<Mutex<Vec<ToolCompletionRequest>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the queue.
    pub fn add_tool_response(&self, response: ToolCompletionResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(response));
    }

    /// Queue an API failure.
    pub fn add_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(Error::Api(message.into())));
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ToolCompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        match responses.pop_front() {
            Some(resp) => resp,
            None => Ok(ToolCompletionResponse::text("mock response")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_mock_returns_queue_then_default() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::text("first"));
        mock.add_error("boom");

        let req = ToolCompletionRequest::new("", vec![Message::user("hi")], vec![]);
        let first = mock.complete_with_tools(req.clone()).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));

        assert!(mock.complete_with_tools(req.clone()).await.is_err());

        let fallback = mock.complete_with_tools(req).await.unwrap();
        assert_eq!(fallback.content.as_deref(), Some("mock response"));
        assert_eq!(mock.requests().len(), 3);
    }
}
