//! # Infrastructure Layer
//!
//! Handles interactions with external systems: MCP server subprocesses and
//! hosted LLM APIs. Implements the traits defined in the Domain layer
//! (`ToolProvider`, `LlmProvider`).

pub mod llm;
pub mod mcp;
