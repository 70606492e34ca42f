//! Reqwest-backed web-search adapter (Brave Search API) plus result-page
//! fetching for contact scraping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::ports::{SearchHit, WebSearch, WebSearchError};

const SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const SCRAPE_USER_AGENT: &str = "Mozilla/5.0 (compatible; AISimBot/1.0)";

#[derive(Deserialize)]
struct SearchResponseDto {
    web: Option<WebResultsDto>,
}

#[derive(Deserialize)]
struct WebResultsDto {
    #[serde(default)]
    results: Vec<WebResultDto>,
}

#[derive(Deserialize)]
struct WebResultDto {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

/// Brave Search adapter for the [`WebSearch`] port.
pub struct BraveSearchClient {
    client: Client,
    search_url: String,
    api_key: String,
}

impl BraveSearchClient {
    /// Build the adapter against the production endpoint.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_search_url(api_key, SEARCH_URL)
    }

    /// Build the adapter against an explicit search endpoint (tests).
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_search_url(
        api_key: impl Into<String>,
        search_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(SEARCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            search_url: search_url.into(),
            api_key: api_key.into(),
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> WebSearchError {
    WebSearchError::transport(error.to_string())
}

#[async_trait]
impl WebSearch for BraveSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, WebSearchError> {
        let count = limit.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .header("X-Subscription-Token", self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("offset", "0"),
                ("mkt", "en-US"),
                ("safesearch", "moderate"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(WebSearchError::rejected(format!(
                "search answered status {}",
                response.status().as_u16()
            )));
        }

        let decoded: SearchResponseDto = response
            .json()
            .await
            .map_err(|err| WebSearchError::decode(err.to_string()))?;

        Ok(decoded
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, result)| SearchHit {
                title: result.title,
                url: result.url,
                description: result.description,
                rank: index + 1,
            })
            .collect())
    }

    async fn fetch_page(&self, url: &str) -> Result<String, WebSearchError> {
        let response = self
            .client
            .get(url)
            .timeout(PAGE_FETCH_TIMEOUT)
            .header(reqwest::header::USER_AGENT, SCRAPE_USER_AGENT)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(WebSearchError::rejected(format!(
                "page answered status {}",
                response.status().as_u16()
            )));
        }

        response.text().await.map_err(map_transport_error)
    }
}
