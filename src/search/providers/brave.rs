use crate::config::settings::SearchConfig;
use crate::search::{RawHit, SearchError, SearchParameters, SearchProvider};
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search API provider
///
/// Requires an API key, from `search.brave_api_key` or the BRAVE_API_KEY
/// environment variable.
/// Free tier: 2000 requests/month
/// Documentation: https://brave.com/search/api/
pub struct BraveSearchProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BraveSearchProvider {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let api_key = config.brave_api_key.clone().unwrap_or_else(|| {
            tracing::warn!("BRAVE_API_KEY not set, web searches will fail");
            String::new()
        });

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build HTTP client for Brave Search")?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
        })
    }

    fn hits_from_json(json: &serde_json::Value) -> Vec<RawHit> {
        let field = |result: &serde_json::Value, key: &str| {
            result[key].as_str().map(|s| s.to_string())
        };

        json["web"]["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .map(|result| RawHit {
                        title: field(result, "title"),
                        href: field(result, "url"),
                        body: field(result, "description"),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SearchProvider for BraveSearchProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, params: &SearchParameters) -> Result<Vec<RawHit>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::InvalidApiKey);
        }

        tracing::debug!(
            query = %params.query,
            max_results = params.max_results,
            "performing brave search"
        );

        let response = self
            .client
            .get(&self.base_url)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("q", params.query.as_str()),
                ("count", &params.max_results.to_string()),
                ("safesearch", params.safesearch.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            tracing::warn!(
                status = %status,
                error = %error_text,
                "brave search api error"
            );

            return match status.as_u16() {
                401 | 403 => Err(SearchError::InvalidApiKey),
                429 => Err(SearchError::RateLimitExceeded),
                503 => Err(SearchError::ServiceUnavailable(503)),
                _ => Err(SearchError::ApiError(format!(
                    "HTTP {}: {}",
                    status, error_text
                ))),
            };
        }

        let json: serde_json::Value = response.json().await?;
        let mut hits = Self::hits_from_json(&json);
        hits.truncate(params.max_results);

        tracing::debug!(
            query = %params.query,
            result_count = hits.len(),
            "brave search completed"
        );

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hits_from_json_maps_fields() {
        let body = json!({
            "web": {
                "results": [
                    {"title": "Rust", "url": "https://www.rust-lang.org/", "description": "A language"},
                    {"url": "https://crates.io/"}
                ]
            }
        });

        let hits = BraveSearchProvider::hits_from_json(&body);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].body.as_deref(), Some("A language"));
        assert_eq!(hits[1].title, None);
        assert_eq!(hits[1].href.as_deref(), Some("https://crates.io/"));
    }

    #[test]
    fn test_hits_from_json_without_web_section() {
        assert!(BraveSearchProvider::hits_from_json(&json!({"type": "search"})).is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let config = SearchConfig {
            brave_api_key: None,
            base_url: Some("http://127.0.0.1:9/".to_string()),
            ..SearchConfig::default()
        };
        let provider = BraveSearchProvider::new(&config).unwrap();
        let params = SearchParameters {
            query: "rust".to_string(),
            max_results: 5,
            safesearch: Default::default(),
        };

        assert!(matches!(
            provider.search(&params).await,
            Err(SearchError::InvalidApiKey)
        ));
    }
}
