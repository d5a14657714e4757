pub mod base;
pub mod web_fetch;
pub mod web_search;

use crate::fetch::JinaReader;
use crate::search::SearchExecutor;
use base::Tool;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tool registry - manages the tools exposed to MCP clients
///
/// A tool may be registered under more than one name; listings report the
/// registered name.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Create a registry with the search and fetch tools registered
    pub fn with_default_tools(executor: SearchExecutor, reader: JinaReader) -> Self {
        let mut registry = Self::new();

        let search: Arc<dyn Tool> = Arc::new(web_search::WebSearchTool::new(executor));
        registry.register(search.clone());
        // Shorter name some MCP clients expect
        registry.register_as("search", search);

        registry.register(Arc::new(web_fetch::JinaFetchTool::new(reader)));

        registry
    }

    /// Register a tool under its own id
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.id().to_string();
        self.register_as(name, tool);
    }

    /// Register a tool under an explicit name
    pub fn register_as(&mut self, name: impl Into<String>, tool: Arc<dyn Tool>) {
        let name = name.into();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "tool registered twice, keeping the latest");
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Get all tool definitions, sorted by name
    pub fn list_tool_definitions(&self) -> Vec<serde_json::Value> {
        self.tools
            .iter()
            .map(|(name, tool)| {
                json!({
                    "name": name,
                    "description": tool.description(),
                    "input_schema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Get all tool names, sorted
    pub fn list_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
