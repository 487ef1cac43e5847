//! Provider factory for creating completion backends
//!
//! Configuration is a tagged enum so a config file picks the backend with
//! `"type": "llmproxy"` or `"type": "openai"`.

use serde::{Deserialize, Serialize};

use crate::providers::{BoxedProvider, LlmProxyProvider, OpenAiProvider, ProviderError};

/// Configuration for the LLMProxy completion service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmProxyConfig {
    /// API key sent in the `x-api-key` header
    pub api_key: String,
    /// Full URL of the generate endpoint
    pub endpoint: String,
    /// Default model to use
    #[serde(default = "default_llmproxy_model")]
    pub default_model: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_llmproxy_model() -> String {
    "4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl LlmProxyConfig {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model: default_llmproxy_model(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Sets the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::config("LLMProxy API key is required"));
        }

        if self.endpoint.is_empty() {
            return Err(ProviderError::config("LLMProxy endpoint cannot be empty"));
        }

        if self.default_model.is_empty() {
            return Err(ProviderError::config(
                "LLMProxy default model cannot be empty",
            ));
        }

        Ok(())
    }
}

/// Configuration for an OpenAI-compatible chat completions API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAiConfig {
    /// API key for bearer authentication
    pub api_key: String,
    /// Base URL (e.g. "https://api.openai.com/v1")
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Default model to use
    #[serde(default = "default_openai_model")]
    pub default_model: String,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_openai_base_url(),
            default_model: default_openai_model(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Sets a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::config("OpenAI API key is required"));
        }

        if self.base_url.is_empty() {
            return Err(ProviderError::config("OpenAI base URL cannot be empty"));
        }

        if self.default_model.is_empty() {
            return Err(ProviderError::config("OpenAI default model cannot be empty"));
        }

        Ok(())
    }
}

/// Provider configuration variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Session-aware completion proxy
    #[serde(rename = "llmproxy")]
    LlmProxy(LlmProxyConfig),
    /// OpenAI-compatible chat completions API
    #[serde(rename = "openai")]
    OpenAi(OpenAiConfig),
}

impl ProviderConfig {
    /// Returns the provider type name
    pub fn provider_type(&self) -> &'static str {
        match self {
            ProviderConfig::LlmProxy(_) => "llmproxy",
            ProviderConfig::OpenAi(_) => "openai",
        }
    }

    pub fn default_model(&self) -> &str {
        match self {
            ProviderConfig::LlmProxy(config) => &config.default_model,
            ProviderConfig::OpenAi(config) => &config.default_model,
        }
    }

    /// Overrides the default model of whichever backend is configured
    pub fn set_default_model(&mut self, model: impl Into<String>) {
        match self {
            ProviderConfig::LlmProxy(config) => config.default_model = model.into(),
            ProviderConfig::OpenAi(config) => config.default_model = model.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        match self {
            ProviderConfig::LlmProxy(config) => config.validate(),
            ProviderConfig::OpenAi(config) => config.validate(),
        }
    }

    /// Creates an LLMProxy configuration
    pub fn llmproxy(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::LlmProxy(LlmProxyConfig::new(api_key, endpoint))
    }

    /// Creates an OpenAI configuration
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAi(OpenAiConfig::new(api_key))
    }
}

/// Factory for creating completion backends from configuration
pub struct ProviderFactory;

impl ProviderFactory {
    /// Validates the configuration and builds the matching backend
    ///
    /// # Example
    ///
    /// ```rust
    /// use finbot::providers::{LlmProvider, ProviderConfig, ProviderFactory};
    ///
    /// let config = ProviderConfig::llmproxy("api-key", "https://proxy.example.com/generate");
    /// let provider = ProviderFactory::create(config).unwrap();
    /// assert_eq!(provider.provider_name(), "llmproxy");
    /// ```
    pub fn create(config: ProviderConfig) -> Result<BoxedProvider, ProviderError> {
        config.validate()?;

        match config {
            ProviderConfig::LlmProxy(config) => Ok(Box::new(LlmProxyProvider::try_new(&config)?)),
            ProviderConfig::OpenAi(config) => Ok(Box::new(OpenAiProvider::try_new(&config)?)),
        }
    }

    /// Creates a provider from JSON configuration
    pub fn create_from_json(json: &str) -> Result<BoxedProvider, ProviderError> {
        let config: ProviderConfig =
            serde_json::from_str(json).map_err(|e| ProviderError::config(e.to_string()))?;
        Self::create(config)
    }

    /// Lists available provider types
    pub fn available_providers() -> Vec<&'static str> {
        vec!["llmproxy", "openai"]
    }
}
