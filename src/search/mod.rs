pub mod executor;
pub mod format;
pub mod params;
pub mod providers;

pub use executor::{FallbackPolicy, SearchExecutor, SearchOutcome};
pub use format::{format_search_result, render, OutputFormat, Rendered, NO_RESULTS_MESSAGE};
pub use params::{SafeSearch, SearchParameters};

use crate::error::ErrorCategory;
use serde::{Deserialize, Serialize};

/// Search provider abstraction - different providers can be plugged in
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Produce an ordered, finite sequence of raw hits for the given parameters
    async fn search(&self, params: &SearchParameters) -> Result<Vec<RawHit>, SearchError>;
}

/// One unnormalized hit as returned by a provider.
///
/// Every field may be missing; the formatter substitutes empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "url")]
    pub href: Option<String>,
    #[serde(default, alias = "snippet")]
    pub body: Option<String>,
}

/// Normalized search result with its 1-indexed rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub position: usize,
}

/// Search-related errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable (HTTP {0})")]
    ServiceUnavailable(u16),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse search results: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

impl SearchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SearchError::NetworkError(_) => ErrorCategory::Network,
            SearchError::RateLimitExceeded | SearchError::ServiceUnavailable(_) => {
                ErrorCategory::Service
            }
            SearchError::ApiError(_) | SearchError::InvalidApiKey => ErrorCategory::Service,
            SearchError::ParseError(_) => ErrorCategory::Content,
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            SearchError::NetworkError(e) if e.is_timeout() => {
                "The search request timed out. Try simplifying the query, \
                 reducing max_results, or waiting a moment before retrying."
            }
            SearchError::NetworkError(_) => {
                "Could not reach the search provider. Check your internet \
                 connection and that no firewall or proxy blocks it."
            }
            SearchError::RateLimitExceeded => {
                "The search provider rate limited this client. Wait 30-60 \
                 seconds and reduce the frequency of searches."
            }
            SearchError::ServiceUnavailable(_) => {
                "The search provider is temporarily unavailable. Try again in a few minutes."
            }
            SearchError::ApiError(_) | SearchError::ParseError(_) => {
                "The search provider returned an unexpected response. Try \
                 rephrasing the query or try again later."
            }
            SearchError::InvalidApiKey => {
                "The search provider rejected the API key. Check BRAVE_API_KEY \
                 or search.brave_api_key in the config file."
            }
        }
    }
}
