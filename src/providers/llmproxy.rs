//! LLMProxy completion backend
//!
//! The proxy keeps conversation state server-side: each request names a
//! `session_id` and how many previous turns (`lastk`) to replay into the
//! model context. The reply carries the generated text in `result`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::providers::factory::LlmProxyConfig;
use crate::providers::{CompletionRequest, LlmProvider, LlmResponse, ProviderError};

/// Request body for the generate endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    query: &'a str,
    temperature: f32,
    lastk: u32,
    session_id: &'a str,
}

/// Response body from the generate endpoint
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(alias = "response")]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for an LLMProxy-style generate endpoint
#[derive(Debug, Clone)]
pub struct LlmProxyProvider {
    endpoint: String,
    api_key: String,
    default_model: String,
    timeout_seconds: u64,
    client: Client,
}

impl LlmProxyProvider {
    /// Builds the provider and its pooled HTTP client
    pub fn try_new(config: &LlmProxyConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            default_model: config.default_model.clone(),
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }

    fn parse_response(&self, response: GenerateResponse) -> Result<LlmResponse, ProviderError> {
        if let Some(message) = response.error {
            return Err(ProviderError::provider(message, None::<&str>));
        }

        response
            .result
            .map(LlmResponse::new)
            .ok_or_else(|| ProviderError::serialization("Response has no 'result' field"))
    }
}

#[async_trait::async_trait]
impl LlmProvider for LlmProxyProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse, ProviderError> {
        info!(
            model = %request.model,
            session_id = %request.session_id,
            lastk = request.history_depth,
            query_length = request.query.len(),
            "Sending generate request to llmproxy"
        );

        let body = GenerateRequest {
            model: &request.model,
            system: &request.system,
            query: &request.query,
            temperature: request.temperature,
            lastk: request.history_depth,
            session_id: &request.session_id,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "llmproxy request failed");
                ProviderError::from_reqwest(&e, self.timeout_seconds)
            })?;

        let status = response.status();
        debug!(status = %status, "Received llmproxy response");

        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &error_text));
        }

        let parsed = response.json::<GenerateResponse>().await.map_err(|e| {
            ProviderError::serialization(format!("Failed to parse response: {}", e))
        })?;

        let llm_response = self.parse_response(parsed)?;
        info!(
            content_length = llm_response.content.len(),
            "Received response from llmproxy"
        );

        Ok(llm_response)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn provider_name(&self) -> &'static str {
        "llmproxy"
    }
}
