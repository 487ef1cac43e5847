use serde::{Deserialize, Serialize};

use crate::providers::ProviderConfig;

/// Identifier of the shared remote conversation when sessions are not split per user
pub const SHARED_SESSION_ID: &str = "GenericSession";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_config: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_id: Option<String>,
    #[serde(default = "default_search_url")]
    pub base_url: String,
    /// Append `Source: <link>` after each snippet
    #[serde(default = "default_true")]
    pub include_sources: bool,
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

fn default_search_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_search_timeout() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            engine_id: None,
            base_url: default_search_url(),
            include_sources: true,
            timeout_seconds: default_search_timeout(),
        }
    }
}

/// Which remote conversation a user's completions are sent to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionScope {
    /// Every user shares one remote conversation
    Shared { session_id: String },
    /// Each user id is its own remote conversation
    PerUser,
}

impl Default for SessionScope {
    fn default() -> Self {
        SessionScope::Shared {
            session_id: SHARED_SESSION_ID.to_string(),
        }
    }
}

impl SessionScope {
    /// Remote session id used for `user_id`'s completions
    pub fn remote_session_id<'a>(&'a self, user_id: &'a str) -> &'a str {
        match self {
            SessionScope::Shared { session_id } => session_id,
            SessionScope::PerUser => user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// Previous remote turns replayed into each answer
    #[serde(default = "default_history_depth")]
    pub history_depth: u32,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub session_scope: SessionScope,
}

fn default_history_depth() -> u32 {
    8
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            temperature: 0.0,
            session_scope: SessionScope::default(),
        }
    }
}

/// Configuration summary that is safe to log
#[derive(Debug, Clone, PartialEq)]
pub struct SafeSummary {
    pub search_configured: bool,
    pub provider_type: Option<&'static str>,
    pub model: Option<String>,
    pub bind_address: String,
    pub shared_session: bool,
}

impl Config {
    pub fn get_safe_summary(&self) -> SafeSummary {
        SafeSummary {
            search_configured: self.search.api_key.is_some() && self.search.engine_id.is_some(),
            provider_type: self.provider_config.as_ref().map(|p| p.provider_type()),
            model: self
                .provider_config
                .as_ref()
                .map(|p| p.default_model().to_string()),
            bind_address: self.server.bind_address(),
            shared_session: matches!(
                self.assistant.session_scope,
                SessionScope::Shared { .. }
            ),
        }
    }
}
