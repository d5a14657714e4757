use super::format::{format_search_result, render, OutputFormat, Rendered};
use super::params::{SearchParameters, DEFAULT_MAX_RESULTS_CEILING};
use super::{SearchError, SearchProvider, SearchResult};
use crate::error::{Error, ErrorCategory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a search returns when the provider fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// No results at all
    #[default]
    Empty,
    /// A single entry describing the failure, linking to the web search page
    Placeholder,
}

/// Raw caller input for one search, before validation
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: i64,
    pub safesearch: &'a str,
    pub output_format: &'a str,
}

/// A completed search: the validated parameters and the rendered results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub params: SearchParameters,
    pub num_results: usize,
    pub rendered: Rendered,
}

/// Runs searches against a provider and numbers the hits.
///
/// Provider failures never escape: they degrade to the configured
/// [`FallbackPolicy`] outcome. There is no retry.
#[derive(Clone)]
pub struct SearchExecutor {
    provider: Arc<dyn SearchProvider>,
    fallback: FallbackPolicy,
    max_results_ceiling: u32,
}

impl SearchExecutor {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            fallback: FallbackPolicy::default(),
            max_results_ceiling: DEFAULT_MAX_RESULTS_CEILING,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_max_results_ceiling(mut self, ceiling: u32) -> Self {
        self.max_results_ceiling = ceiling;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn max_results_ceiling(&self) -> u32 {
        self.max_results_ceiling
    }

    /// Check raw input against the validator and this executor's ceiling.
    pub fn validate(
        &self,
        request: &SearchRequest<'_>,
    ) -> Result<(SearchParameters, OutputFormat), Error> {
        let params = SearchParameters::validate(
            request.query,
            request.max_results,
            request.safesearch,
            self.max_results_ceiling,
        )?;
        let format: OutputFormat = request.output_format.parse()?;
        Ok((params, format))
    }

    /// Validate, search and render in one go.
    ///
    /// Only validation errors are returned; nothing touches the network
    /// until every parameter has passed.
    pub async fn run(&self, request: &SearchRequest<'_>) -> Result<SearchOutcome, Error> {
        let (params, format) = self.validate(request)?;
        let results = self.execute(&params).await;
        let num_results = results.len();
        if num_results == 0 {
            tracing::warn!(
                query = %params.query,
                safesearch = %params.safesearch,
                max_results = params.max_results,
                "no results found"
            );
        }

        Ok(SearchOutcome {
            params,
            num_results,
            rendered: render(results, format),
        })
    }

    pub async fn search_and_render(&self, request: &SearchRequest<'_>) -> Result<Rendered, Error> {
        self.run(request).await.map(|outcome| outcome.rendered)
    }

    pub async fn execute(&self, params: &SearchParameters) -> Vec<SearchResult> {
        tracing::debug!(
            provider = self.provider.name(),
            query = %params.query,
            max_results = params.max_results,
            safesearch = %params.safesearch,
            "executing search"
        );

        match self.provider.search(params).await {
            Ok(hits) => {
                if hits.len() > params.max_results {
                    tracing::trace!(
                        returned = hits.len(),
                        max_results = params.max_results,
                        "provider over-delivered, truncating"
                    );
                }

                let results: Vec<SearchResult> = hits
                    .iter()
                    .take(params.max_results)
                    .enumerate()
                    .map(|(idx, hit)| format_search_result(hit, idx + 1))
                    .collect();

                tracing::debug!(
                    query = %params.query,
                    result_count = results.len(),
                    "search completed"
                );
                results
            }
            Err(e) => {
                match e.category() {
                    ErrorCategory::Network | ErrorCategory::Service => tracing::warn!(
                        provider = self.provider.name(),
                        query = %params.query,
                        error = %e,
                        "search provider failed, using fallback"
                    ),
                    _ => tracing::error!(
                        provider = self.provider.name(),
                        query = %params.query,
                        error = %e,
                        "search provider failed, using fallback"
                    ),
                }
                self.fallback_outcome(params, &e)
            }
        }
    }

    fn fallback_outcome(&self, params: &SearchParameters, error: &SearchError) -> Vec<SearchResult> {
        match self.fallback {
            FallbackPolicy::Empty => Vec::new(),
            FallbackPolicy::Placeholder => vec![SearchResult {
                title: "Search unavailable".to_string(),
                url: format!(
                    "https://duckduckgo.com/?q={}",
                    urlencoding::encode(&params.query)
                ),
                snippet: format!("{error}. {}", error.guidance()),
                position: 1,
            }],
        }
    }
}
