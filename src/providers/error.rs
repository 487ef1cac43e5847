//! Error types for completion provider operations
//!
//! Errors are categorized so the webhook layer can report a stable error shape.
//! Nothing in this crate retries a failed completion call.

use thiserror::Error;

/// Errors that can occur when calling a completion backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network-related errors (connection refused, DNS failures, broken bodies)
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// Authentication errors (invalid API key, unauthorized access)
    #[error("Authentication error: {message}")]
    Auth {
        /// Error message
        message: String,
    },

    /// Rate limit errors (too many requests, quota exceeded)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message
        message: String,
    },

    /// Invalid request errors (bad parameters, malformed input)
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// Timeout errors (request took too long)
    #[error("Request timeout after {seconds} seconds")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// Errors reported by the completion service itself
    #[error("Provider error: {message}")]
    Provider {
        /// Error message from provider
        message: String,
        /// Optional error code from provider
        code: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// Configuration errors (missing API key, unusable endpoint)
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

impl ProviderError {
    /// Returns true if this error indicates an authentication problem
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ProviderError::Auth { .. })
    }

    /// Creates a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Creates an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a timeout error
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Creates a provider error
    pub fn provider(message: impl Into<String>, code: Option<impl Into<String>>) -> Self {
        Self::Provider {
            message: message.into(),
            code: code.map(|c| c.into()),
        }
    }

    /// Creates a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Maps a reqwest transport failure, keeping timeouts distinct
    pub fn from_reqwest(err: &reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            Self::timeout(timeout_seconds)
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else {
            Self::network(format!("Request failed: {}", err))
        }
    }

    /// Maps a non-success HTTP status and its body to an error
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        use reqwest::StatusCode;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::auth(format!("Authentication failed ({}): {}", status, body))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                Self::rate_limit(format!("Rate limit exceeded ({}): {}", status, body))
            }
            status if status.is_client_error() => {
                Self::invalid_request(format!("Client error ({}): {}", status, body))
            }
            status if status.is_server_error() => Self::provider(
                format!("Server error ({}): {}", status, body),
                Some(status.as_u16().to_string()),
            ),
            _ => Self::provider(
                format!("Unexpected status ({}): {}", status, body),
                Some(status.as_u16().to_string()),
            ),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
