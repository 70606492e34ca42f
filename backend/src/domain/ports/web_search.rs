//! Port for the web-search API and result-page fetching.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors raised by web-search adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebSearchError {
    /// Network-level failure.
    #[error("web search transport failed: {message}")]
    Transport { message: String },
    /// The search API rejected the request.
    #[error("web search rejected: {message}")]
    Rejected { message: String },
    /// Undecodable response body.
    #[error("web search response undecodable: {message}")]
    Decode { message: String },
}

impl WebSearchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub description: String,
    pub rank: usize,
}

/// Driving port over the web-search API plus best-effort page retrieval for
/// contact scraping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, WebSearchError>;

    /// Fetch a result page's HTML for scraping.
    async fn fetch_page(&self, url: &str) -> Result<String, WebSearchError>;
}

/// Fixture search returning no hits.
pub struct FixtureWebSearch;

#[async_trait]
impl WebSearch for FixtureWebSearch {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, WebSearchError> {
        Ok(Vec::new())
    }

    async fn fetch_page(&self, _url: &str) -> Result<String, WebSearchError> {
        Err(WebSearchError::transport("no web search provider configured"))
    }
}
