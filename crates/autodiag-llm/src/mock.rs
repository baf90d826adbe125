//! Mock LLM Provider for testing
//!
//! Replies are scripted up front and consumed in order. Every request the
//! provider receives is recorded so tests can assert on prompts and call counts.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text as the completion content
    Text(String),
    /// Fail with a network error carrying this message
    NetworkError(String),
}

/// A mock LLM provider that returns queued replies or a default text.
#[derive(Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
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
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider that answers with the given texts in order.
    #[must_use]
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for text in texts {
            provider.add_text(text);
        }
        provider
    }

    /// Queue a text reply.
    pub fn add_text(&self, text: impl Into<String>) {
        self.add_reply(MockReply::Text(text.into()));
    }

    /// Queue any reply.
    pub fn add_reply(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Number of `complete` calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// All requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
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

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model.clone()
        };
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(MockReply::Text(content)) => Ok(CompletionResponse {
                content,
                usage: None,
                finish_reason: Some("STOP".to_string()),
                model,
            }),
            Some(MockReply::NetworkError(msg)) => Err(Error::Network(msg)),
            // Default behavior if queue empty
            None => Ok(CompletionResponse {
                content: "mock response".to_string(),
                usage: None,
                finish_reason: Some("STOP".to_string()),
                model,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_replies_are_consumed_in_order() {
        let provider = MockProvider::with_texts(["one", "two"]);

        let first = provider
            .complete(CompletionRequest::new("").with_message(Message::user("a")))
            .await
            .unwrap();
        let second = provider
            .complete(CompletionRequest::new("").with_message(Message::user("b")))
            .await
            .unwrap();
        let third = provider.complete(CompletionRequest::new("")).await.unwrap();

        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");
        assert_eq!(third.content, "mock response");
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.requests()[1].prompt_text(), "b");
    }

    #[test]
    fn test_network_error_reply() {
        let provider = MockProvider::new();
        provider.add_reply(MockReply::NetworkError("connection reset".to_string()));

        let err = tokio_test::block_on(provider.complete(CompletionRequest::new("m"))).unwrap_err();
        assert!(matches!(err, Error::Network(ref m) if m == "connection reset"));
        assert_eq!(provider.call_count(), 1);
    }
}
