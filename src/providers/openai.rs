//! OpenAI-compatible completion backend
//!
//! Works with any chat completions API (OpenAI native, OpenRouter, local
//! gateways). These APIs keep no conversation on the server, so the request's
//! history depth and session id are not forwarded.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::providers::factory::OpenAiConfig;
use crate::providers::{CompletionRequest, LlmProvider, LlmResponse, ProviderError};

/// OpenAI API request body format
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

/// OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    default_model: String,
    timeout_seconds: u64,
    client: Client,
}

impl OpenAiProvider {
    /// Creates the provider, returning an error if the HTTP client cannot be built
    pub fn try_new(config: &OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.default_model.clone(),
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }

    /// Builds the chat request: the system instruction followed by the query
    fn build_request(&self, request: &CompletionRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model.clone(),
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: Some(request.system.clone()),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: Some(request.query.clone()),
                },
            ],
            temperature: request.temperature,
        }
    }

    /// Parses the OpenAI response into LlmResponse
    fn parse_response(&self, response: OpenAiResponse) -> Result<LlmResponse, ProviderError> {
        if let Some(error) = response.error {
            return Err(ProviderError::provider(
                error.message,
                error.code.or(error.error_type),
            ));
        }

        let choice =
            response.choices.into_iter().next().ok_or_else(|| {
                ProviderError::provider("No response choices returned", None::<&str>)
            })?;

        let mut llm_response = LlmResponse::new(choice.message.content.unwrap_or_default());
        if let Some(usage) = response.usage {
            llm_response = llm_response.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }

        Ok(llm_response)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse, ProviderError> {
        info!(
            model = %request.model,
            query_length = request.query.len(),
            "Sending chat request to openai"
        );
        debug!(
            history_depth = request.history_depth,
            session_id = %request.session_id,
            "Stateless backend: history depth and session id are not forwarded"
        );

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Request failed");
                ProviderError::from_reqwest(&e, self.timeout_seconds)
            })?;

        let status = response.status();
        debug!(status = %status, "Received response");

        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &error_text));
        }

        let parsed = response.json::<OpenAiResponse>().await.map_err(|e| {
            ProviderError::serialization(format!("Failed to parse response: {}", e))
        })?;

        let llm_response = self.parse_response(parsed)?;
        info!(
            content_length = llm_response.content.len(),
            prompt_tokens = ?llm_response.prompt_tokens,
            completion_tokens = ?llm_response.completion_tokens,
            "Received response from openai"
        );

        Ok(llm_response)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
