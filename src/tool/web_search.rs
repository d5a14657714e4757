use crate::error::Error;
use crate::search::executor::SearchRequest;
use crate::search::params::DEFAULT_MAX_RESULTS;
use crate::search::{Rendered, SafeSearch, SearchExecutor};
use crate::tool::base::{Tool, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Web search tool - searches DuckDuckGo (or the configured provider)
///
/// Provider failures come back as an empty list rather than an error;
/// only invalid arguments fail the call.
pub struct WebSearchTool {
    executor: SearchExecutor,
}

impl WebSearchTool {
    pub fn new(executor: SearchExecutor) -> Self {
        Self { executor }
    }
}

/// `max_results` as sent by MCP clients, some of which stringify integers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaxResults {
    Int(i64),
    Text(String),
}

impl MaxResults {
    fn coerce(self) -> Result<i64, Error> {
        match self {
            MaxResults::Int(n) => Ok(n),
            MaxResults::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                Error::invalid_parameter(
                    "max_results",
                    format!("Invalid max_results: '{text}'. max_results must be a positive integer."),
                )
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    max_results: Option<MaxResults>,
    #[serde(default)]
    safesearch: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn id(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web using DuckDuckGo. \
         Returns a list of results, each with title, url, snippet and a 1-based position. \
         \n\n\
         Usage notes:\n\
         - output_format 'json' (default) returns structured results\n\
         - output_format 'text' returns an LLM-friendly numbered list\n\
         - If the search provider fails, the result list is empty; rephrase or retry later"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": self.executor.max_results_ceiling(),
                    "default": DEFAULT_MAX_RESULTS,
                    "description": "Maximum number of search results to return"
                },
                "safesearch": {
                    "type": "string",
                    "enum": ["strict", "moderate", "off"],
                    "default": SafeSearch::default().as_str(),
                    "description": "Safe search setting"
                },
                "output_format": {
                    "type": "string",
                    "enum": ["json", "text"],
                    "default": "json",
                    "description": "'json' for a list of results, 'text' for formatted text"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: WebSearchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let query = params
            .query
            .ok_or_else(|| Error::invalid_parameter("query", "Missing required parameter: query"))?;
        let max_results = match params.max_results {
            Some(value) => value.coerce()?,
            None => DEFAULT_MAX_RESULTS,
        };
        let safesearch = params
            .safesearch
            .unwrap_or_else(|| SafeSearch::default().as_str().to_string());
        let output_format = params.output_format.unwrap_or_else(|| "json".to_string());

        tracing::debug!(
            query = %query,
            max_results,
            safesearch = %safesearch,
            output_format = %output_format,
            "duckduckgo_search called"
        );

        let outcome = self
            .executor
            .run(&SearchRequest {
                query: &query,
                max_results,
                safesearch: &safesearch,
                output_format: &output_format,
            })
            .await?;

        let output = match outcome.rendered {
            Rendered::Structured(results) => ToolOutput::Json(serde_json::to_value(&results)?),
            Rendered::Text(text) => ToolOutput::Text(text),
        };

        Ok(ToolResult::new(format!("Web search: {}", outcome.params.query), output)
            .with_metadata("num_results", json!(outcome.num_results))
            .with_metadata("query", json!(outcome.params.query))
            .with_metadata("provider", json!(self.executor.provider_name())))
    }
}
