//! MCP server exposing the tool registry over stdio.

use crate::tool::base::ToolError;
use crate::tool::ToolRegistry;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;

const SERVER_INSTRUCTIONS: &str = "Web search through DuckDuckGo. \
Use duckduckgo_search (alias: search) to find pages, then jina_fetch to read one as markdown.";

#[derive(Clone)]
pub struct SearchServer {
    registry: Arc<ToolRegistry>,
}

impl SearchServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// MCP tool definitions for every registered name.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .list_names()
            .into_iter()
            .filter_map(|name| {
                let tool = self.registry.get(&name)?;
                let schema = match tool.input_schema() {
                    serde_json::Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                Some(Tool::new(
                    name,
                    tool.description().to_string(),
                    Arc::new(schema),
                ))
            })
            .collect()
    }

    /// Run a tool by name.
    ///
    /// Unknown names are protocol errors. Anything the tool itself rejects is
    /// reported in-band as an error result carrying guidance. Successful calls
    /// carry the rendered text plus the full
    /// [`ToolResult`](crate::tool::base::ToolResult) as structured content.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.registry.get(name).ok_or_else(|| {
            tracing::warn!(tool = %name, "unknown tool requested");
            McpError::invalid_request(format!("Unknown tool: {name}"), None)
        })?;

        let arguments = serde_json::Value::Object(arguments.unwrap_or_default());
        match tool.execute(arguments).await {
            Ok(result) => {
                tracing::debug!(tool = %name, title = %result.title, "tool call succeeded");
                let text = result
                    .output
                    .to_text()
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                let structured = result
                    .to_structured()
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                let mut call_result = CallToolResult::success(vec![Content::text(text)]);
                call_result.structured_content = Some(structured);
                Ok(call_result)
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(error_text(&e))]))
            }
        }
    }
}

fn error_text(err: &ToolError) -> String {
    match err {
        ToolError::Failed(e) => format!(
            "Error [{}:{}]: {}\n\nWhat to do:\n{}",
            e.category().as_str().to_uppercase(),
            e.code(),
            e,
            e.guidance()
        ),
        other => other.to_string(),
    }
}

impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_instructions(SERVER_INSTRUCTIONS)
            .with_server_info(Implementation::from_build_env())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            meta: None,
            tools: self.tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, arguments = ?request.arguments, "call_tool");
        self.dispatch(&request.name, request.arguments).await
    }
}

/// Serve the registry on stdin/stdout until the client disconnects.
pub async fn serve_stdio(registry: ToolRegistry) -> anyhow::Result<()> {
    let names = registry.list_names();
    tracing::info!(tools = ?names, "starting MCP server on stdio");

    let running = SearchServer::new(registry).serve(stdio()).await?;
    let reason = running.waiting().await?;

    tracing::info!(reason = ?reason, "MCP server stopped");
    Ok(())
}
