//! Registry - Tool registration and dispatch
//!
//! This module provides the registry that maps tool names to handlers.
//! Dispatch always returns a [`ToolResult`] envelope: unknown names and
//! handler failures become error-tagged results, never a panic or a
//! process failure.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A single block of tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text output
    Text {
        /// The text payload
        text: String,
    },
}

/// Result of a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Output blocks (non-empty on success)
    pub content: Vec<ContentBlock>,
    /// Whether the invocation failed
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful text result
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Create a failed result with a human-readable message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// The first text block, if any
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        }).next()
    }
}

/// Tool metadata and input schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for the arguments
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    /// Create a new descriptor with an empty object schema
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    /// Set the input schema
    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool descriptor
    fn descriptor(&self) -> &ToolDescriptor;

    /// Run the tool with the given arguments.
    ///
    /// Handlers validate their own arguments and convert internal failures
    /// into error-tagged results; an `Err` escaping here is treated as a
    /// handler bug and converted by the registry.
    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult>;
}

/// Registry mapping tool names to handlers
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name.clone();
        debug!(tool = %name, "Registering tool");
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List descriptors in registration order
    #[must_use]
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor())
            .collect()
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call by name.
    ///
    /// Unknown names and escaped handler errors are converted into
    /// error-tagged results so a single bad call can never take down the
    /// process.
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return ToolResult::error(format!("Unknown tool: {name}"));
        };

        debug!(tool = %name, "Dispatching tool call");
        match tool.run(arguments).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %name, error = %e, "Handler error escaped tool boundary");
                ToolResult::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FixedTool {
        descriptor: ToolDescriptor,
        fail: bool,
    }

    impl FixedTool {
        fn new(name: &str, fail: bool) -> Self {
            Self {
                descriptor: ToolDescriptor::new(name, "a fixed tool"),
                fail,
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for FixedTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn run(&self, _arguments: serde_json::Value) -> Result<ToolResult> {
            if self.fail {
                return Err(Error::InvalidArgument("boom".to_string()));
            }
            Ok(ToolResult::text("ok"))
        }
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::text("fine");
        assert!(!ok.is_error);
        assert_eq!(ok.first_text(), Some("fine"));

        let err = ToolResult::error("bad");
        assert!(err.is_error);
        assert_eq!(err.first_text(), Some("bad"));
    }

    #[test]
    fn test_tool_result_wire_shape() {
        let value = serde_json::to_value(ToolResult::text("hello")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "content": [{"type": "text", "text": "hello"}],
                "isError": false
            })
        );
    }

    #[test]
    fn test_descriptor_wire_shape() {
        let value = serde_json::to_value(ToolDescriptor::new("t", "does t")).unwrap();
        assert_eq!(value["name"], "t");
        assert!(value["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.call("does_not_exist", serde_json::json!({})).await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Unknown tool: does_not_exist"));
    }

    #[tokio::test]
    async fn test_unknown_tool_does_not_poison_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool::new("steady", false)));

        let bad = registry.call("does_not_exist", serde_json::json!({})).await;
        assert!(bad.is_error);

        let good = registry.call("steady", serde_json::json!({})).await;
        assert!(!good.is_error);
        assert_eq!(good.first_text(), Some("ok"));
    }

    #[tokio::test]
    async fn test_escaped_error_becomes_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool::new("flaky", true)));

        let result = registry.call("flaky", serde_json::json!({})).await;
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("boom"));
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool::new("zeta", false)));
        registry.register(Arc::new(FixedTool::new("alpha", false)));

        let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
