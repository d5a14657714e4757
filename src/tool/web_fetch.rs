use super::base::{Tool, ToolError, ToolOutput, ToolResult};
use crate::fetch::{FetchFormat, FetchOutput, FetchRequest, JinaReader};
use serde::Deserialize;
use serde_json::json;

/// Jina fetch tool - Fetch a URL as markdown or JSON through Jina Reader
pub struct JinaFetchTool {
    reader: JinaReader,
}

impl JinaFetchTool {
    pub fn new(reader: JinaReader) -> Self {
        Self { reader }
    }
}

#[derive(Debug, Deserialize)]
struct JinaFetchParams {
    #[serde(default)]
    url: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    with_images: bool,
}

#[async_trait::async_trait]
impl Tool for JinaFetchTool {
    fn id(&self) -> &str {
        "jina_fetch"
    }

    fn description(&self) -> &str {
        "Fetch a URL and convert it to markdown or JSON using Jina Reader. \
         Handles HTML pages and PDFs. \
         Use max_length to cap the size of the returned content."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The http(s) URL to fetch and convert",
                    "format": "uri"
                },
                "format": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown",
                    "description": "Output format"
                },
                "max_length": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum content length to return (omit for no limit)"
                },
                "with_images": {
                    "type": "boolean",
                    "default": false,
                    "description": "Generate alt text for images"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: JinaFetchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let format = match params.format.as_deref() {
            Some(format) => format.parse::<FetchFormat>()?,
            None => FetchFormat::default(),
        };

        tracing::debug!(url = %params.url, format = ?format, "jina_fetch start");

        let output = self
            .reader
            .fetch(&FetchRequest {
                url: params.url.clone(),
                format,
                max_length: params.max_length,
                with_images: params.with_images,
            })
            .await
            .map_err(crate::error::Error::from)?;

        let (output, content_length) = match output {
            FetchOutput::Markdown(text) => {
                let len = text.len();
                (ToolOutput::Text(text), len)
            }
            FetchOutput::Json(value) => {
                let len = value.to_string().len();
                (ToolOutput::Json(value), len)
            }
        };

        Ok(ToolResult::new(format!("Fetched {}", params.url.trim()), output)
            .with_metadata("url", json!(params.url.trim()))
            .with_metadata("content_length", json!(content_length)))
    }
}
