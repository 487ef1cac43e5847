//! Completion provider module for finbot
//!
//! The assistant treats text generation as an opaque remote call: it sends a
//! system instruction, a query, a temperature, a history depth and a session
//! identifier, and gets generated text back.
//!
//! # Architecture
//!
//! - `LlmProvider` trait defines the interface all backends implement
//! - `llmproxy` talks to a session-aware completion proxy (the default backend)
//! - `openai` talks to any OpenAI-compatible chat completions API
//! - `ProviderFactory` creates the configured backend
//!
//! # Example
//!
//! ```rust
//! use finbot::providers::{CompletionRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = CompletionRequest::new("4o-mini", "You are helpful", "Hello!")
//!         .with_history_depth(8)
//!         .with_session_id("GenericSession");
//!
//!     let response = provider.generate(request).await.unwrap();
//!     println!("Response: {}", response.content);
//! }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub mod factory;
pub mod llmproxy;
#[cfg(test)]
pub mod mock;
pub mod openai;

pub use error::ProviderError;
pub use factory::{LlmProxyConfig, OpenAiConfig, ProviderConfig, ProviderFactory};
pub use llmproxy::LlmProxyProvider;
pub use openai::OpenAiProvider;

/// A single call to the completion service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Model name understood by the backend
    pub model: String,
    /// System instruction
    pub system: String,
    /// User-side query text
    pub query: String,
    /// Sampling temperature
    pub temperature: f32,
    /// How many previous turns of the remote session the backend should use
    pub history_depth: u32,
    /// Remote conversation identifier
    pub session_id: String,
}

impl CompletionRequest {
    /// Creates a stateless request with temperature 0
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            query: query.into(),
            temperature: 0.0,
            history_depth: 0,
            session_id: String::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_history_depth(mut self, depth: u32) -> Self {
        self.history_depth = depth;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

/// Response from the completion provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmResponse {
    /// Generated text
    pub content: String,
    /// Number of tokens in the prompt (if provided by provider)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    /// Number of tokens in the completion (if provided by provider)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
}

impl LlmResponse {
    /// Creates a new response with just content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }

    /// Adds token usage information
    pub fn with_tokens(mut self, prompt: u32, completion: u32) -> Self {
        self.prompt_tokens = Some(prompt);
        self.completion_tokens = Some(completion);
        self
    }

    /// Returns the total token count if available
    pub fn total_tokens(&self) -> Option<u32> {
        match (self.prompt_tokens, self.completion_tokens) {
            (Some(p), Some(c)) => Some(p + c),
            _ => None,
        }
    }
}

/// Trait for completion backends (LLMProxy, OpenAI-compatible, ...)
///
/// All implementations must be Send + Sync so one instance can serve
/// concurrent webhook requests.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends one completion request and returns the generated text
    ///
    /// Backends that keep no server-side conversation may ignore
    /// `history_depth` and `session_id`.
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse, ProviderError>;

    /// Returns the default model for this provider
    fn default_model(&self) -> String;

    /// Returns the provider name, used for logging
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed LlmProvider trait object
pub type BoxedProvider = Box<dyn LlmProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_defaults() {
        let request = CompletionRequest::new("4o-mini", "system", "query");
        assert_eq!(request.model, "4o-mini");
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.history_depth, 0);
        assert!(request.session_id.is_empty());
    }

    #[test]
    fn test_completion_request_builders() {
        let request = CompletionRequest::new("m", "s", "q")
            .with_temperature(0.7)
            .with_history_depth(8)
            .with_session_id("GenericSession");

        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.history_depth, 8);
        assert_eq!(request.session_id, "GenericSession");
    }

    #[test]
    fn test_llm_response_creation() {
        let response = LlmResponse::new("Hello!");
        assert_eq!(response.content, "Hello!");
        assert!(response.total_tokens().is_none());
    }

    #[test]
    fn test_llm_response_with_tokens() {
        let response = LlmResponse::new("Hello").with_tokens(10, 5);

        assert_eq!(response.prompt_tokens, Some(10));
        assert_eq!(response.completion_tokens, Some(5));
        assert_eq!(response.total_tokens(), Some(15));
    }

    #[test]
    fn test_llm_response_skips_missing_usage() {
        let json = serde_json::to_string(&LlmResponse::new("hi")).unwrap();
        assert!(!json.contains("prompt_tokens"));
    }
}
