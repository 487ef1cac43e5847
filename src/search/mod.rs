//! Web search used to ground market questions in live data
//!
//! A search returns one text blob: the top result snippets, each followed by
//! its source link, or a fixed sentinel when the provider has nothing usable.

pub mod error;
pub mod google;

pub use error::SearchError;
pub use google::GoogleSearchClient;

use serde::Deserialize;

/// Returned when the provider answers with a non-success status or no items
pub const NO_RESULTS: &str = "No relevant results found.";

/// Maximum number of result items folded into one search blob
pub const MAX_RESULTS: usize = 5;

/// One result item as returned by the search provider
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchItem {
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

impl SearchItem {
    pub fn new(snippet: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            link: link.into(),
        }
    }
}

/// Trait for web search backends
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Searches the web for `query` and returns the joined result text
    ///
    /// Non-success answers from the provider resolve to [`NO_RESULTS`];
    /// only transport and decoding failures are errors.
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

/// Joins up to [`MAX_RESULTS`] items into one blob
///
/// With sources each item reads `"<snippet>\nSource: <link>\n"`; blocks are
/// separated by a single space. Zero items, or only empty snippets when
/// sources are left out, yields [`NO_RESULTS`].
pub fn format_results(items: &[SearchItem], include_sources: bool) -> String {
    let selected = &items[..items.len().min(MAX_RESULTS)];
    let nothing_to_show =
        selected.is_empty() || (!include_sources && selected.iter().all(|i| i.snippet.is_empty()));
    if nothing_to_show {
        return NO_RESULTS.to_string();
    }

    selected
        .iter()
        .map(|item| {
            if include_sources {
                format!("{}\nSource: {}\n", item.snippet, item.link)
            } else {
                item.snippet.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
