//! Chat tools - direct conversation and single-prompt completion

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDescriptor, ToolResult};
use advisor_llm::{ChatMessage, CompletionClient, CompletionParams};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChatArgs {
    messages: Vec<ChatMessage>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionArgs {
    prompt: String,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

fn apply_overrides(
    mut params: CompletionParams,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
) -> CompletionParams {
    if let Some(model) = model {
        params = params.with_model(model);
    }
    if let Some(max_tokens) = max_tokens {
        params = params.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = temperature {
        params = params.with_temperature(temperature);
    }
    params
}

// ============================================================================
// Chat Tool
// ============================================================================

/// Tool for multi-turn conversations with the model
pub struct ClaudeChatTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn CompletionClient>,
}

impl ClaudeChatTool {
    /// Create a new chat tool
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let descriptor = ToolDescriptor::new(
            "claude_chat",
            "Send messages to Claude for conversational AI responses. Supports multi-turn \
             conversations with system prompts.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "messages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "role": {"type": "string", "enum": ["user", "assistant"]},
                            "content": {"type": "string"}
                        },
                        "required": ["role", "content"]
                    },
                    "description": "Array of messages in the conversation"
                },
                "model": {
                    "type": "string",
                    "description": "Claude model to use (default: claude-3-5-sonnet-20241022)"
                },
                "max_tokens": {
                    "type": "number",
                    "description": "Maximum tokens in response (default: 1024)"
                },
                "temperature": {
                    "type": "number",
                    "description": "Response creativity (0-1, default: 0.7)"
                },
                "system": {
                    "type": "string",
                    "description": "System prompt to guide the model's behavior"
                }
            },
            "required": ["messages"]
        }));

        Self { descriptor, client }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: ChatArgs = serde_json::from_value(arguments)
            .map_err(|e| Error::InvalidArgument(format!("invalid arguments for claude_chat: {e}")))?;

        if args.messages.is_empty() {
            return Err(Error::InvalidArgument(
                "claude_chat requires at least one message".to_string(),
            ));
        }

        let mut params = apply_overrides(
            CompletionParams::new(args.messages),
            args.model,
            args.max_tokens,
            args.temperature,
        );
        if let Some(system) = args.system {
            params = params.with_system(system);
        }

        debug!(messages = params.messages.len(), "Running chat completion");
        Ok(self.client.complete(params).await?)
    }
}

#[async_trait::async_trait]
impl Tool for ClaudeChatTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Error: {e}")),
        })
    }
}

// ============================================================================
// Completion Tool
// ============================================================================

/// Tool for single-turn prompt completion
pub struct ClaudeCompletionTool {
    descriptor: ToolDescriptor,
    client: Arc<dyn CompletionClient>,
}

impl ClaudeCompletionTool {
    /// Create a new completion tool
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let descriptor = ToolDescriptor::new(
            "claude_completion",
            "Get text completion from Claude for a given prompt. Simpler interface for \
             single-turn interactions.",
        )
        .with_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "The text prompt to complete"
                },
                "model": {
                    "type": "string",
                    "description": "Claude model to use (default: claude-3-5-sonnet-20241022)"
                },
                "max_tokens": {
                    "type": "number",
                    "description": "Maximum tokens in response (default: 1024)"
                },
                "temperature": {
                    "type": "number",
                    "description": "Response creativity (0-1, default: 0.7)"
                }
            },
            "required": ["prompt"]
        }));

        Self { descriptor, client }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String> {
        let args: CompletionArgs = serde_json::from_value(arguments).map_err(|e| {
            Error::InvalidArgument(format!("invalid arguments for claude_completion: {e}"))
        })?;

        let params = apply_overrides(
            CompletionParams::prompt(args.prompt),
            args.model,
            args.max_tokens,
            args.temperature,
        );

        Ok(self.client.complete(params).await?)
    }
}

#[async_trait::async_trait]
impl Tool for ClaudeCompletionTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, arguments: serde_json::Value) -> Result<ToolResult> {
        Ok(match self.execute(arguments).await {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Error: {e}")),
        })
    }
}
