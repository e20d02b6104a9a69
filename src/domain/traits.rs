//! # Domain Traits
//!
//! Abstract interfaces for the two external collaborators of an agent run:
//! the tool server and the language model.

use async_trait::async_trait;

use crate::domain::types::{ToolOutput, ToolSpec};
use crate::infrastructure::llm::{ChatRequest, ChatResponse, Error};

/// Something that exposes callable tools (an MCP server or several of them).
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Tools discovered at startup, in server order.
    fn tools(&self) -> &[ToolSpec];

    /// Invoke a tool by name. `arguments` is a JSON object (or null for no arguments).
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> anyhow::Result<ToolOutput>;
}

/// Abstract interface for an LLM Provider
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one chat completion, possibly returning tool calls.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, Error>;

    /// Label for logs (e.g. "anthropic/claude-sonnet-4-5-20250929").
    fn describe(&self) -> String;
}
