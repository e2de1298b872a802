//! Tool registry and the built-in tool descriptors.
//!
//! The tool surface is fixed at startup: three tools, registered once and
//! immutable for the process lifetime. Argument validation against these
//! descriptors happens in the dispatcher.

use crate::protocol::ToolDefinition;
use serde_json::json;
use std::collections::HashMap;

/// Registry of available MCP tools.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in tools.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        for tool in builtin_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool.
    pub fn register(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tools.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.values().collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// The fixed tool surface of the knowledge-base server.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search_knowledge".to_string(),
            description: Some(
                "Search the knowledge base for documents semantically similar to the query. \
                 Returns id, content, metadata and distance per match, closest first."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Natural-language search query"
                    },
                    "n_results": {
                        "type": "integer",
                        "description": "Maximum number of results to return",
                        "default": 5
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "list_collections".to_string(),
            description: Some(
                "List all collections available in the vector store.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDefinition {
            name: "get_page".to_string(),
            description: Some(
                "Fetch a documentation page by its page number and return the raw content. \
                 The number matches the numeric prefix of ids returned by search_knowledge."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_num": {
                        "type": "integer",
                        "description": "Page number, e.g. 100 for page 100"
                    }
                },
                "required": ["page_num"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_the_three_tools() {
        let registry = ToolRegistry::with_builtin_tools();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("search_knowledge"));
        assert!(registry.contains("list_collections"));
        assert!(registry.contains("get_page"));
        assert!(!registry.contains("drop_tables"));
    }

    #[test]
    fn search_schema_requires_query_only() {
        let registry = ToolRegistry::with_builtin_tools();
        let tool = registry.get("search_knowledge").unwrap();
        assert_eq!(tool.input_schema["required"], serde_json::json!(["query"]));
        assert_eq!(tool.input_schema["properties"]["n_results"]["default"], 5);
    }

    #[test]
    fn empty_registry_reports_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }
}
