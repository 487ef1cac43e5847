use thiserror::Error;

/// Failures that prevent a search from producing any text
///
/// A provider that answers with an error status is not a failure: the search
/// resolves to the no-results sentinel instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("Search request failed: {message}")]
    Network { message: String },

    #[error("Search request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Search response could not be decoded: {message}")]
    Decode { message: String },

    #[error("Search client could not be built: {message}")]
    Client { message: String },
}

impl SearchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }
}
