use serde::Serialize;
use std::collections::HashMap;

/// Tool payload: structured data or plain text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Json(serde_json::Value),
    Text(String),
}

impl ToolOutput {
    /// Encode for a text-only transport (pretty JSON or the text verbatim)
    pub fn to_text(&self) -> serde_json::Result<String> {
        match self {
            ToolOutput::Json(value) => serde_json::to_string_pretty(value),
            ToolOutput::Text(text) => Ok(text.clone()),
        }
    }
}

/// Tool execution result returned to the MCP client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    /// Human-readable title/summary
    pub title: String,
    /// Tool output content
    pub output: ToolOutput,
    /// Additional metadata (result counts, provider, ...)
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    pub fn new(title: impl Into<String>, output: ToolOutput) -> Self {
        Self {
            title: title.into(),
            output,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Structured payload for MCP clients: title, output and metadata as one object
    pub fn to_structured(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Tool execution errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments didn't match the tool's schema
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Failed(#[from] crate::error::Error),

    #[error("Failed to serialize tool output: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Base tool trait - all tools must implement this
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier (e.g., "duckduckgo_search", "jina_fetch")
    fn id(&self) -> &str;

    /// Human-readable description for the MCP client
    fn description(&self) -> &str;

    /// JSON schema for tool parameters
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given parameters
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError>;
}
