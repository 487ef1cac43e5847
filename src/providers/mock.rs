//! Mock completion provider for testing
//!
//! Responses can be queued so one test can script a classifier verdict
//! followed by an answer. Every request is recorded for verification.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::providers::{CompletionRequest, LlmProvider, LlmResponse, ProviderError};

/// Mock provider for testing
pub struct MockLlmProvider {
    /// Responses returned in order, one per call
    queued: Arc<Mutex<VecDeque<LlmResponse>>>,
    /// Returned once the queue is empty
    fallback: Arc<Mutex<LlmResponse>>,
    /// Optional error to return instead of any response
    error: Arc<Mutex<Option<ProviderError>>>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    default_model: String,
}

impl MockLlmProvider {
    /// Creates a new mock provider with default settings
    pub fn new() -> Self {
        Self {
            queued: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(LlmResponse::new("Mock response"))),
            error: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_model: "mock-model".to_string(),
        }
    }

    /// Creates a mock that answers each call with the given texts in order
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for response in responses {
            mock.push_response(response);
        }
        mock
    }

    /// Queues one response
    pub fn push_response(&self, content: impl Into<String>) {
        self.queued
            .lock()
            .unwrap()
            .push_back(LlmResponse::new(content));
    }

    /// Sets the error to return (instead of the response)
    pub fn set_error(&self, error: ProviderError) {
        *self.error.lock().unwrap() = Some(error);
    }

    /// Returns the number of times generate() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Returns all requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns the last request received
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockLlmProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);

        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }

        let next = self.queued.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.lock().unwrap().clone()))
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str) -> CompletionRequest {
        CompletionRequest::new("model", "system", query)
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mock = MockLlmProvider::scripted(["yes", "Answer"]);

        assert_eq!(mock.generate(request("a")).await.unwrap().content, "yes");
        assert_eq!(mock.generate(request("b")).await.unwrap().content, "Answer");
        assert_eq!(
            mock.generate(request("c")).await.unwrap().content,
            "Mock response"
        );
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockLlmProvider::new();
        mock.generate(request("first")).await.unwrap();
        mock.generate(request("second")).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].query, "first");
        assert_eq!(mock.last_request().unwrap().query, "second");
    }

    #[tokio::test]
    async fn test_error_is_returned() {
        let mock = MockLlmProvider::new();
        mock.set_error(ProviderError::network("Connection failed"));

        let err = mock.generate(request("hi")).await.unwrap_err();
        assert!(err.to_string().contains("Network error"));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_mock_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockLlmProvider>();
    }
}
